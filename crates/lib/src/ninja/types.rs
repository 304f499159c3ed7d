//! Parsed build file declarations.

/// A named command template, reusable by multiple build statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDecl {
  /// Rule name, unique within a file.
  pub name: String,

  /// Command template; may reference `$in`, `$out`, and the `$$` escape.
  pub command: String,

  /// Line the `rule` keyword appeared on (for diagnostics).
  pub line: usize,
}

/// One `build` statement: outputs, the rule producing them, and inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeDecl {
  /// Name of the rule this statement invokes.
  pub rule: String,

  /// Declared outputs, in order. Never empty.
  pub outputs: Vec<String>,

  /// Declared inputs, in order. May be empty.
  pub inputs: Vec<String>,

  /// Line the `build` keyword appeared on (for diagnostics).
  pub line: usize,
}

/// The parsed contents of a build file.
///
/// An empty file parses to zero rules and zero edges; whether that is an
/// error is decided later, when targets are selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NinjaFile {
  pub rules: Vec<RuleDecl>,
  pub edges: Vec<EdgeDecl>,

  /// Targets named by `default` statements, in declaration order.
  pub defaults: Vec<String>,
}

impl NinjaFile {
  /// Returns true if the file declared nothing at all.
  pub fn is_empty(&self) -> bool {
    self.rules.is_empty() && self.edges.is_empty() && self.defaults.is_empty()
  }
}
