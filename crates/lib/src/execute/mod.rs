//! Plan execution.
//!
//! Runs the stale edges of a build plan wave by wave: each wave's edges are
//! spawned onto a `JoinSet` with a semaphore bounding global parallelism, and
//! the wave is collected before the next one starts, so an edge never runs
//! before its producers have completed successfully.
//!
//! Failure policy: upon the first command failure no further wave is
//! scheduled; edges already spawned in the same wave run to completion (they
//! are not killed, avoiding partially written outputs) and every edge that
//! never started is recorded as skipped. Outputs of completed edges are left
//! in place.

pub mod cmd;
mod types;

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::graph::Graph;
use crate::plan::BuildPlan;

pub use types::{BuildReport, CommandOutput, ExecuteConfig, ExecuteError};

/// Execute a build plan, returning a report of what ran.
pub async fn execute_plan(graph: &Graph, plan: &BuildPlan, config: &ExecuteConfig) -> BuildReport {
  let total = plan.edge_count();
  info!(
    edges = total,
    waves = plan.waves.len(),
    parallelism = config.parallelism,
    "starting execution"
  );

  let semaphore = Arc::new(Semaphore::new(config.parallelism.max(1)));
  let mut report = BuildReport::default();
  let mut started = 0usize;

  for wave in &plan.waves {
    if report.failed.is_some() {
      report.skipped.extend(wave.iter().copied());
      continue;
    }

    let mut join_set = JoinSet::new();
    for &edge_id in wave {
      started += 1;
      let command = graph.command(edge_id);
      println!("[{started}/{total}] {command}");

      let semaphore = semaphore.clone();
      join_set.spawn(async move {
        let _permit = semaphore.acquire().await.expect("semaphore closed");
        let result = cmd::run_command(&command).await;
        (edge_id, result)
      });
    }

    // Collect the whole wave; edges already spawned run to completion even
    // if one of them fails.
    while let Some(joined) = join_set.join_next().await {
      match joined {
        Ok((edge_id, Ok(_output))) => {
          debug!(edge = %graph.edge_name(edge_id), "edge complete");
          report.completed.push(edge_id);
        }
        Ok((edge_id, Err(e))) => {
          error!(edge = %graph.edge_name(edge_id), error = %e, "edge failed");
          if report.failed.is_none() {
            report.failed = Some((edge_id, e));
          }
        }
        Err(e) => {
          error!(error = %e, "edge task panicked");
        }
      }
    }
  }

  info!(
    completed = report.completed.len(),
    failed = report.failed.is_some(),
    skipped = report.skipped.len(),
    "execution complete"
  );
  report
}
