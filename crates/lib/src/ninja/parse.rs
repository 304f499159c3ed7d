//! Line-oriented parser for the minimal ninja grammar.
//!
//! Recognized forms:
//!
//! ```text
//! rule <name>
//!   command = <template>
//!
//! build <outputs...>: <rule-name> <inputs...>
//! default <targets...>
//! ```
//!
//! `#`-comments and blank lines are skipped. Command templates may reference
//! `$in`, `$out`, and the `$$` escape; anything else is rejected here so that
//! rendering never fails later.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::types::{EdgeDecl, NinjaFile, RuleDecl};

/// Errors produced while loading or parsing a build file.
#[derive(Debug, Error)]
pub enum ParseError {
  /// The build file does not exist at the expected path. Distinct from a
  /// present-but-empty file, which parses successfully to zero declarations.
  #[error("build file not found: {}", .0.display())]
  NotFound(PathBuf),

  /// The build file could not be read.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// A line did not match the grammar.
  #[error("syntax error at line {line}: {message}")]
  Syntax { line: usize, message: String },

  /// Two `rule` declarations share a name.
  #[error("duplicate rule '{0}'")]
  DuplicateRule(String),
}

fn syntax(line: usize, message: impl Into<String>) -> ParseError {
  ParseError::Syntax {
    line,
    message: message.into(),
  }
}

/// Read and parse a build file from disk.
///
/// A missing file is reported as [`ParseError::NotFound`]; an existing but
/// empty file parses to an empty [`NinjaFile`].
pub fn load(path: &Path) -> Result<NinjaFile, ParseError> {
  if !path.is_file() {
    return Err(ParseError::NotFound(path.to_path_buf()));
  }
  let text = std::fs::read_to_string(path)?;
  parse(&text)
}

/// A rule whose `command` binding may not have been seen yet.
struct PendingRule {
  name: String,
  command: Option<String>,
  line: usize,
}

/// Parse build file text into rule and build declarations.
pub fn parse(text: &str) -> Result<NinjaFile, ParseError> {
  let mut rules: Vec<PendingRule> = Vec::new();
  let mut file = NinjaFile::default();
  // Index into `rules` while its indented block is still open.
  let mut open_rule: Option<usize> = None;

  for (idx, raw) in text.lines().enumerate() {
    let line = idx + 1;

    if raw.trim().is_empty() {
      open_rule = None;
      continue;
    }
    let trimmed = raw.trim_start();
    if trimmed.starts_with('#') {
      continue;
    }

    if raw.starts_with(' ') || raw.starts_with('\t') {
      let Some(rule_idx) = open_rule else {
        return Err(syntax(line, "indented binding outside a rule block"));
      };
      let (key, value) = split_binding(trimmed, line)?;
      if key != "command" {
        return Err(syntax(
          line,
          format!(
            "unsupported binding '{key}' in rule '{}' (only 'command' is recognized)",
            rules[rule_idx].name
          ),
        ));
      }
      if rules[rule_idx].command.is_some() {
        return Err(syntax(
          line,
          format!("duplicate 'command' binding in rule '{}'", rules[rule_idx].name),
        ));
      }
      check_template(value, line)?;
      rules[rule_idx].command = Some(value.to_string());
      continue;
    }

    open_rule = None;
    let mut words = trimmed.split_whitespace();
    match words.next() {
      Some("rule") => {
        let Some(name) = words.next() else {
          return Err(syntax(line, "expected a rule name after 'rule'"));
        };
        if words.next().is_some() {
          return Err(syntax(line, format!("unexpected token after rule name '{name}'")));
        }
        if rules.iter().any(|r| r.name == name) {
          return Err(ParseError::DuplicateRule(name.to_string()));
        }
        rules.push(PendingRule {
          name: name.to_string(),
          command: None,
          line,
        });
        open_rule = Some(rules.len() - 1);
      }
      Some("build") => {
        file.edges.push(parse_build(trimmed, line)?);
      }
      Some("default") => {
        let targets: Vec<String> = words.map(str::to_string).collect();
        if targets.is_empty() {
          return Err(syntax(line, "expected at least one target after 'default'"));
        }
        file.defaults.extend(targets);
      }
      Some(other) => {
        return Err(syntax(
          line,
          format!("expected 'rule', 'build', or 'default', got '{other}'"),
        ));
      }
      None => unreachable!("blank lines are skipped above"),
    }
  }

  for rule in rules {
    let Some(command) = rule.command else {
      return Err(syntax(rule.line, format!("rule '{}' has no command", rule.name)));
    };
    file.rules.push(RuleDecl {
      name: rule.name,
      command,
      line: rule.line,
    });
  }

  Ok(file)
}

/// Parse a `build <outputs...>: <rule-name> <inputs...>` statement.
fn parse_build(stmt: &str, line: usize) -> Result<EdgeDecl, ParseError> {
  let rest = stmt.strip_prefix("build").expect("caller matched the keyword");
  let Some((lhs, rhs)) = rest.split_once(':') else {
    return Err(syntax(line, "expected ':' in build statement"));
  };

  let outputs: Vec<String> = lhs.split_whitespace().map(str::to_string).collect();
  if outputs.is_empty() {
    return Err(syntax(line, "build statement declares no outputs"));
  }

  let mut words = rhs.split_whitespace();
  let Some(rule) = words.next() else {
    return Err(syntax(line, "expected a rule name after ':'"));
  };
  let inputs: Vec<String> = words.map(str::to_string).collect();

  Ok(EdgeDecl {
    rule: rule.to_string(),
    outputs,
    inputs,
    line,
  })
}

/// Split an indented `key = value` binding.
fn split_binding(text: &str, line: usize) -> Result<(&str, &str), ParseError> {
  let Some((key, value)) = text.split_once('=') else {
    return Err(syntax(line, "expected a 'key = value' binding"));
  };
  Ok((key.trim(), value.trim()))
}

/// Reject command templates referencing anything other than `$in`, `$out`,
/// or the `$$` escape. Variable expansion is deliberately not supported.
fn check_template(template: &str, line: usize) -> Result<(), ParseError> {
  let mut chars = template.chars().peekable();
  while let Some(c) = chars.next() {
    if c != '$' {
      continue;
    }
    if chars.peek() == Some(&'$') {
      chars.next();
      continue;
    }
    let mut name = String::new();
    while let Some(&n) = chars.peek() {
      if n.is_ascii_alphanumeric() || n == '_' || n == '-' {
        name.push(n);
        chars.next();
      } else {
        break;
      }
    }
    match name.as_str() {
      "in" | "out" => {}
      "" => return Err(syntax(line, "invalid '$' escape in command")),
      other => {
        return Err(syntax(
          line,
          format!("unknown variable '${other}' in command (only $in and $out are supported)"),
        ));
      }
    }
  }
  Ok(())
}
