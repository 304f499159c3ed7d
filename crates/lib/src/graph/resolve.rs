//! Resolution of parsed declarations into a validated graph.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use crate::ninja::NinjaFile;

use super::types::{Edge, Graph, GraphError, Node, NodeId, Rule};

impl Graph {
  /// Resolve a parsed build file into a graph, validating its structure.
  ///
  /// `dir` is the directory node paths are resolved against when checking
  /// whether a source input exists on disk.
  ///
  /// Validation short-circuits on the first error, in this order: unknown
  /// rule references and duplicate producers while edges are linked, then
  /// missing source inputs once every producer is known, then `default`
  /// targets. Cycle detection happens separately, in
  /// [`ExecutionDag::from_graph`](super::ExecutionDag::from_graph).
  pub fn resolve(file: &NinjaFile, dir: impl Into<PathBuf>) -> Result<Graph, GraphError> {
    let dir = dir.into();

    let rules: Vec<Rule> = file
      .rules
      .iter()
      .map(|r| Rule {
        name: r.name.clone(),
        command: r.command.clone(),
      })
      .collect();
    let rule_index: HashMap<&str, usize> =
      rules.iter().enumerate().map(|(idx, r)| (r.name.as_str(), idx)).collect();

    let mut nodes: Vec<Node> = Vec::new();
    let mut by_path: HashMap<String, NodeId> = HashMap::new();
    let mut edges: Vec<Edge> = Vec::new();

    // First pass: create edges, intern their nodes, claim producers.
    for decl in &file.edges {
      let rule = *rule_index
        .get(decl.rule.as_str())
        .ok_or_else(|| GraphError::UnknownRule(decl.rule.clone()))?;
      let edge_id = edges.len();

      let mut outputs = Vec::with_capacity(decl.outputs.len());
      for path in &decl.outputs {
        let id = intern(&mut nodes, &mut by_path, path);
        if nodes[id].producer.is_some() {
          return Err(GraphError::DuplicateOutput(path.clone()));
        }
        nodes[id].producer = Some(edge_id);
        outputs.push(id);
      }

      let mut inputs = Vec::with_capacity(decl.inputs.len());
      for path in &decl.inputs {
        let id = intern(&mut nodes, &mut by_path, path);
        nodes[id].consumers.push(edge_id);
        inputs.push(id);
      }

      edges.push(Edge { rule, inputs, outputs });
    }

    let graph = Graph {
      rules,
      nodes,
      edges,
      by_path,
      defaults: Vec::new(),
      dir,
    };

    // Second pass: every input with no producer must exist on disk. Deferred
    // until all edges are linked so a producer declared later still counts.
    for (_, edge) in graph.edges() {
      for &input in &edge.inputs {
        let node = graph.node(input);
        if node.producer.is_none() && !graph.abs_path(input).exists() {
          return Err(GraphError::MissingInput {
            input: node.path.clone(),
            output: graph.node(edge.outputs[0]).path.clone(),
          });
        }
      }
    }

    let mut graph = graph;
    for target in &file.defaults {
      let id = graph
        .lookup(target)
        .ok_or_else(|| GraphError::UnknownTarget(target.clone()))?;
      graph.defaults.push(id);
    }

    debug!(
      nodes = graph.node_count(),
      edges = graph.edge_count(),
      defaults = graph.defaults.len(),
      "graph resolved"
    );
    Ok(graph)
  }
}

/// Intern a path, returning the id of its node.
fn intern(nodes: &mut Vec<Node>, by_path: &mut HashMap<String, NodeId>, path: &str) -> NodeId {
  if let Some(&id) = by_path.get(path) {
    return id;
  }
  let id = nodes.len();
  nodes.push(Node {
    path: path.to_string(),
    producer: None,
    consumers: Vec::new(),
  });
  by_path.insert(path.to_string(), id);
  id
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use crate::graph::{Graph, GraphError};
  use crate::ninja;

  fn resolve_in(dir: &std::path::Path, text: &str) -> Result<Graph, GraphError> {
    Graph::resolve(&ninja::parse(text).unwrap(), dir)
  }

  #[test]
  fn resolves_a_single_edge() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("loremipsum.txt"), "lorem ipsum").unwrap();

    let g = resolve_in(
      temp.path(),
      "rule capitalize\n  command = dd if=$in of=$out conv=ucase\nbuild loremipsum.txt.u: capitalize loremipsum.txt\n",
    )
    .unwrap();

    assert_eq!(g.edge_count(), 1);
    assert_eq!(g.node_count(), 2);
    let out = g.lookup("loremipsum.txt.u").unwrap();
    assert_eq!(g.node(out).producer, Some(0));
    let src = g.lookup("loremipsum.txt").unwrap();
    assert_eq!(g.node(src).producer, None);
    assert_eq!(g.node(src).consumers, vec![0]);
  }

  #[test]
  fn unknown_rule_is_rejected() {
    let temp = TempDir::new().unwrap();
    let err = resolve_in(temp.path(), "build a: nosuchrule b\n").unwrap_err();
    assert_eq!(err.to_string(), "unknown rule 'nosuchrule'");
  }

  #[test]
  fn duplicate_output_is_rejected() {
    let temp = TempDir::new().unwrap();
    let err = resolve_in(
      temp.path(),
      "rule r\n  command = touch $out\nbuild a: r\nbuild a: r\n",
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "multiple rules generate 'a'");
  }

  #[test]
  fn missing_source_input_reports_the_contracted_message() {
    let temp = TempDir::new().unwrap();
    let err = resolve_in(
      temp.path(),
      "rule capitalize\n  command = dd if=$in of=$out conv=ucase\nbuild loremipsum.txt.u: capitalize loremipsum.txt\n",
    )
    .unwrap_err();
    assert_eq!(
      err.to_string(),
      "'loremipsum.txt', needed by 'loremipsum.txt.u', missing and no known rule to make it"
    );
  }

  #[test]
  fn produced_input_need_not_exist_on_disk() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("src"), "").unwrap();

    // 'mid' does not exist, but a later edge produces it.
    let g = resolve_in(
      temp.path(),
      "rule r\n  command = cp $in $out\nbuild final: r mid\nbuild mid: r src\n",
    )
    .unwrap();
    assert_eq!(g.edge_count(), 2);
  }

  #[test]
  fn default_must_name_a_known_node() {
    let temp = TempDir::new().unwrap();
    let err = resolve_in(
      temp.path(),
      "rule r\n  command = touch $out\nbuild a: r\ndefault nope\n",
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "unknown target 'nope'");
  }

  #[test]
  fn default_resolves_to_node_ids() {
    let temp = TempDir::new().unwrap();
    let g = resolve_in(
      temp.path(),
      "rule r\n  command = touch $out\nbuild a: r\nbuild b: r\ndefault b\n",
    )
    .unwrap();
    assert_eq!(g.defaults().len(), 1);
    assert_eq!(g.node(g.defaults()[0]).path, "b");
  }
}
