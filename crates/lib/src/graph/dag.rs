//! Execution DAG over build edges.
//!
//! Wraps a petgraph `DiGraph` whose nodes are the build graph's edges and
//! whose arcs run from producer to dependent. Provides cycle detection,
//! parallel execution waves, and target-restricted reachability.

use std::collections::HashSet;

use petgraph::Direction;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use super::types::{EdgeId, Graph, GraphError};

/// Dependency ordering over the edges of a [`Graph`].
///
/// Construction fails with [`GraphError::Cycle`] if the edges cannot be
/// ordered; a successfully constructed value is known acyclic.
#[derive(Debug)]
pub struct ExecutionDag {
  graph: DiGraph<EdgeId, ()>,
  /// Map from build-graph edge id to petgraph node index.
  indices: Vec<NodeIndex>,
}

impl ExecutionDag {
  /// Build the DAG from a resolved graph and verify it is acyclic.
  pub fn from_graph(build: &Graph) -> Result<Self, GraphError> {
    let mut graph = DiGraph::new();
    let indices: Vec<NodeIndex> = (0..build.edge_count()).map(|id| graph.add_node(id)).collect();

    for (edge_id, edge) in build.edges() {
      for &input in &edge.inputs {
        if let Some(producer) = build.node(input).producer {
          // Arc from the producing edge to its dependent.
          graph.add_edge(indices[producer], indices[edge_id], ());
        }
      }
    }

    let dag = Self { graph, indices };
    dag.verify_acyclic(build)?;
    Ok(dag)
  }

  /// Verify the graph is acyclic, naming the paths on a cycle otherwise.
  fn verify_acyclic(&self, build: &Graph) -> Result<(), GraphError> {
    if toposort(&self.graph, None).is_ok() {
      return Ok(());
    }
    for scc in tarjan_scc(&self.graph) {
      let cyclic = scc.len() > 1 || self.graph.find_edge(scc[0], scc[0]).is_some();
      if !cyclic {
        continue;
      }
      let mut names: Vec<&str> = scc.iter().map(|&ix| build.edge_name(self.graph[ix])).collect();
      names.push(names[0]);
      let walk = names.iter().map(|n| format!("'{n}'")).collect::<Vec<_>>().join(" -> ");
      return Err(GraphError::Cycle(walk));
    }
    Ok(())
  }

  /// Group edges into execution waves: every edge's producers sit in an
  /// earlier wave, and edges within a wave have no ordering constraint
  /// between them. Edge ids within a wave are sorted for determinism.
  pub fn waves(&self) -> Vec<Vec<EdgeId>> {
    let mut in_degree: Vec<usize> = self
      .graph
      .node_indices()
      .map(|ix| self.graph.neighbors_directed(ix, Direction::Incoming).count())
      .collect();

    let mut ready: Vec<NodeIndex> = self
      .graph
      .node_indices()
      .filter(|ix| in_degree[ix.index()] == 0)
      .collect();

    let mut waves = Vec::new();
    while !ready.is_empty() {
      let mut wave: Vec<EdgeId> = Vec::with_capacity(ready.len());
      let mut next = Vec::new();
      for ix in ready {
        wave.push(self.graph[ix]);
        for dependent in self.graph.neighbors_directed(ix, Direction::Outgoing) {
          let deg = &mut in_degree[dependent.index()];
          *deg -= 1;
          if *deg == 0 {
            next.push(dependent);
          }
        }
      }
      wave.sort_unstable();
      waves.push(wave);
      ready = next;
    }
    waves
  }

  /// The set of edges transitively needed to produce the given root edges,
  /// roots included. Explicit worklist traversal; the visited set doubles as
  /// the result.
  pub fn reachable(&self, roots: impl IntoIterator<Item = EdgeId>) -> HashSet<EdgeId> {
    let mut visited: HashSet<EdgeId> = HashSet::new();
    let mut stack: Vec<EdgeId> = roots.into_iter().collect();
    while let Some(edge) = stack.pop() {
      if !visited.insert(edge) {
        continue;
      }
      for producer in self.graph.neighbors_directed(self.indices[edge], Direction::Incoming) {
        stack.push(self.graph[producer]);
      }
    }
    visited
  }
}
