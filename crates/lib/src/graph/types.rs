//! Build graph types.

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

/// Identifies a node (file-system path) in the graph.
pub type NodeId = usize;

/// Identifies an edge (build step) in the graph.
pub type EdgeId = usize;

/// Errors detected while resolving a graph.
#[derive(Debug, Error)]
pub enum GraphError {
  /// A build statement references a rule that was never declared.
  #[error("unknown rule '{0}'")]
  UnknownRule(String),

  /// A path is declared as the output of more than one edge.
  #[error("multiple rules generate '{0}'")]
  DuplicateOutput(String),

  /// An input has no producing edge and does not exist on disk.
  ///
  /// The wording of this message is a stable contract; callers match on it.
  #[error("'{input}', needed by '{output}', missing and no known rule to make it")]
  MissingInput { input: String, output: String },

  /// The edges form a dependency cycle.
  #[error("dependency cycle: {0}")]
  Cycle(String),

  /// A `default` statement names a path the graph does not know.
  #[error("unknown target '{0}'")]
  UnknownTarget(String),
}

/// A named command template reusable by multiple edges. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct Rule {
  pub name: String,
  pub command: String,
}

/// One build step binding specific input and output nodes to a rule.
#[derive(Debug, Clone)]
pub struct Edge {
  /// Index into the graph's rule table.
  pub rule: usize,
  pub inputs: Vec<NodeId>,
  pub outputs: Vec<NodeId>,
}

/// A file-system path tracked in the graph: either a pure source (no
/// producing edge) or the output of exactly one edge.
#[derive(Debug, Clone)]
pub struct Node {
  pub path: String,
  pub producer: Option<EdgeId>,
  pub consumers: Vec<EdgeId>,
}

/// The resolved, validated build graph. Immutable after resolution; all
/// execution-time bookkeeping lives outside it.
#[derive(Debug)]
pub struct Graph {
  pub(crate) rules: Vec<Rule>,
  pub(crate) nodes: Vec<Node>,
  pub(crate) edges: Vec<Edge>,
  pub(crate) by_path: HashMap<String, NodeId>,
  pub(crate) defaults: Vec<NodeId>,

  /// Directory node paths are resolved against for file-system checks.
  pub(crate) dir: PathBuf,
}

impl Graph {
  pub fn node(&self, id: NodeId) -> &Node {
    &self.nodes[id]
  }

  pub fn edge(&self, id: EdgeId) -> &Edge {
    &self.edges[id]
  }

  /// The rule an edge invokes.
  pub fn rule(&self, edge: EdgeId) -> &Rule {
    &self.rules[self.edges[edge].rule]
  }

  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  pub fn edge_count(&self) -> usize {
    self.edges.len()
  }

  /// Iterate edges with their ids.
  pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
    self.edges.iter().enumerate()
  }

  /// Look up a node by its path as written in the build file.
  pub fn lookup(&self, path: &str) -> Option<NodeId> {
    self.by_path.get(path).copied()
  }

  /// Absolute path of a node for file-system checks.
  pub fn abs_path(&self, id: NodeId) -> PathBuf {
    self.dir.join(&self.nodes[id].path)
  }

  /// Targets named by `default` statements.
  pub fn defaults(&self) -> &[NodeId] {
    &self.defaults
  }

  /// Produced paths that no edge consumes, in declaration order.
  pub fn terminal_outputs(&self) -> Vec<NodeId> {
    (0..self.nodes.len())
      .filter(|&id| self.nodes[id].producer.is_some() && self.nodes[id].consumers.is_empty())
      .collect()
  }

  /// Display name for an edge: its first output path.
  pub fn edge_name(&self, id: EdgeId) -> &str {
    &self.nodes[self.edges[id].outputs[0]].path
  }

  /// Render the shell command for an edge, substituting `$in` with the
  /// space-joined inputs and `$out` with the space-joined outputs.
  ///
  /// Infallible: templates were validated at parse time.
  pub fn command(&self, id: EdgeId) -> String {
    let edge = &self.edges[id];
    let template = &self.rules[edge.rule].command;
    let in_list = self.join_paths(&edge.inputs);
    let out_list = self.join_paths(&edge.outputs);

    let mut rendered = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
      if c != '$' {
        rendered.push(c);
        continue;
      }
      if chars.peek() == Some(&'$') {
        chars.next();
        rendered.push('$');
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
        "in" => rendered.push_str(&in_list),
        "out" => rendered.push_str(&out_list),
        _ => unreachable!("template validated at parse time"),
      }
    }
    rendered
  }

  fn join_paths(&self, ids: &[NodeId]) -> String {
    ids
      .iter()
      .map(|&id| self.nodes[id].path.as_str())
      .collect::<Vec<_>>()
      .join(" ")
  }
}
