//! Staleness evaluation and build planning.
//!
//! Given a resolved graph and a target selection, computes the minimal
//! dependency-ordered subset of edges that must run: an edge is stale if any
//! of its outputs is missing, any output is older than an input, or a
//! producing dependency is itself stale. Pure source inputs are never stale;
//! their timestamps are the baseline.

use std::collections::{HashMap, HashSet};
use std::time::SystemTime;

use thiserror::Error;
use tracing::debug;

use crate::graph::{EdgeId, ExecutionDag, Graph, NodeId};

/// Errors produced while selecting targets or statting files.
#[derive(Debug, Error)]
pub enum PlanError {
  /// A requested target is not a path the graph knows about.
  #[error("unknown target '{0}'")]
  UnknownTarget(String),

  /// No targets were requested and the build file declares no outputs.
  /// Deliberate CLI contract: an empty build file is an error, not a no-op.
  #[error("no targets to build: build file declares no build statements")]
  NothingToBuild,

  /// A file could not be statted for reasons other than absence.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// The ordered subset of edges scheduled to run, grouped into waves with no
/// intra-wave ordering constraints. Empty when everything is up to date.
#[derive(Debug, Default)]
pub struct BuildPlan {
  pub waves: Vec<Vec<EdgeId>>,
}

impl BuildPlan {
  pub fn is_empty(&self) -> bool {
    self.waves.is_empty()
  }

  /// Total number of edges scheduled.
  pub fn edge_count(&self) -> usize {
    self.waves.iter().map(Vec::len).sum()
  }

  /// Iterate scheduled edges in execution order.
  pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
    self.waves.iter().flatten().copied()
  }
}

/// Compute the plan for a target selection.
///
/// Targets are, in order of preference: the explicit names given, the build
/// file's `default` declarations, or every terminal output. Each needed edge
/// is evaluated once, in dependency order, so transitive staleness falls out
/// of a single pass over the waves.
pub fn compute_plan(graph: &Graph, dag: &ExecutionDag, targets: &[String]) -> Result<BuildPlan, PlanError> {
  let target_nodes = resolve_targets(graph, targets)?;
  let roots: Vec<EdgeId> = target_nodes.iter().filter_map(|&n| graph.node(n).producer).collect();
  let needed = dag.reachable(roots);

  let mut stale: HashSet<EdgeId> = HashSet::new();
  let mut mtimes: HashMap<NodeId, Option<SystemTime>> = HashMap::new();
  let mut waves = Vec::new();

  for wave in dag.waves() {
    let mut wave_stale = Vec::new();
    for edge_id in wave {
      if !needed.contains(&edge_id) {
        continue;
      }
      if is_stale(graph, edge_id, &stale, &mut mtimes)? {
        stale.insert(edge_id);
        wave_stale.push(edge_id);
      }
    }
    if !wave_stale.is_empty() {
      waves.push(wave_stale);
    }
  }

  debug!(
    needed = needed.len(),
    stale = stale.len(),
    waves = waves.len(),
    "plan computed"
  );
  Ok(BuildPlan { waves })
}

/// Resolve the requested target names to nodes.
fn resolve_targets(graph: &Graph, targets: &[String]) -> Result<Vec<NodeId>, PlanError> {
  if !targets.is_empty() {
    return targets
      .iter()
      .map(|t| graph.lookup(t).ok_or_else(|| PlanError::UnknownTarget(t.clone())))
      .collect();
  }
  if !graph.defaults().is_empty() {
    return Ok(graph.defaults().to_vec());
  }
  let terminals = graph.terminal_outputs();
  if terminals.is_empty() {
    return Err(PlanError::NothingToBuild);
  }
  Ok(terminals)
}

/// Decide whether one edge must run, given the stale set of its ancestors.
fn is_stale(
  graph: &Graph,
  edge_id: EdgeId,
  stale: &HashSet<EdgeId>,
  mtimes: &mut HashMap<NodeId, Option<SystemTime>>,
) -> Result<bool, PlanError> {
  let edge = graph.edge(edge_id);

  // Transitive: an ancestor is about to rewrite one of our inputs.
  for &input in &edge.inputs {
    if let Some(producer) = graph.node(input).producer
      && stale.contains(&producer)
    {
      return Ok(true);
    }
  }

  let mut oldest_output: Option<SystemTime> = None;
  for &output in &edge.outputs {
    match mtime(graph, output, mtimes)? {
      None => return Ok(true),
      Some(t) => oldest_output = Some(oldest_output.map_or(t, |o| o.min(t))),
    }
  }

  for &input in &edge.inputs {
    match mtime(graph, input, mtimes)? {
      // A missing produced input means its producer is stale, caught above;
      // guard anyway so a vanished file forces a rebuild.
      None => return Ok(true),
      Some(t) => {
        if oldest_output.is_some_and(|o| o < t) {
          return Ok(true);
        }
      }
    }
  }

  Ok(false)
}

/// Modification time of a node's path, None if it does not exist.
fn mtime(
  graph: &Graph,
  node: NodeId,
  cache: &mut HashMap<NodeId, Option<SystemTime>>,
) -> Result<Option<SystemTime>, PlanError> {
  if let Some(&t) = cache.get(&node) {
    return Ok(t);
  }
  let t = match std::fs::metadata(graph.abs_path(node)) {
    Ok(meta) => Some(meta.modified()?),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
    Err(e) => return Err(e.into()),
  };
  cache.insert(node, t);
  Ok(t)
}
