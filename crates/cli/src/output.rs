//! CLI output helpers.

use owo_colors::{OwoColorize, Stream};

/// Print a fatal diagnostic as a single `error: <description>` line.
///
/// The prefix is styled only when stderr is a terminal; piped output stays
/// plain, so callers matching on the exact wording see it unchanged.
pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    "error:".if_supports_color(Stream::Stderr, |s| s.red()),
    message
  );
}
