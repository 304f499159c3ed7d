//! Build file parsing.
//!
//! Turns the textual `build.ninja`-style declarations into structured
//! rule/build records. Parsing is a pure transformation; only the loader
//! touches the file system, and only for the single build file.

mod parse;
mod types;

pub use parse::{ParseError, load, parse};
pub use types::{EdgeDecl, NinjaFile, RuleDecl};
