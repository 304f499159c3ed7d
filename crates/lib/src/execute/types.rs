//! Types for plan execution.

use thiserror::Error;

use crate::graph::EdgeId;

/// Errors that can occur while running an edge's command.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The command ran and exited non-zero. `code` is None when the process
  /// was terminated by a signal.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  /// The command could not be spawned at all.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Captured output of a finished command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
  pub stdout: String,
  pub stderr: String,
}

/// Configuration for plan execution.
#[derive(Debug, Clone)]
pub struct ExecuteConfig {
  /// Maximum number of edges running concurrently.
  pub parallelism: usize,
}

impl Default for ExecuteConfig {
  fn default() -> Self {
    Self {
      parallelism: num_cpus(),
    }
  }
}

/// Get the number of CPUs for default parallelism.
fn num_cpus() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}

/// Result of executing a build plan.
///
/// At most one failure is recorded; once it happens, no further wave is
/// scheduled and the edges that never started are listed as skipped.
/// Outputs of edges that completed before the failure stay on disk.
#[derive(Debug, Default)]
pub struct BuildReport {
  /// Edges whose commands exited zero.
  pub completed: Vec<EdgeId>,

  /// First edge whose command failed, with the error.
  pub failed: Option<(EdgeId, ExecuteError)>,

  /// Edges never started because an earlier command failed.
  pub skipped: Vec<EdgeId>,
}

impl BuildReport {
  /// Returns true if every scheduled edge completed.
  pub fn is_success(&self) -> bool {
    self.failed.is_none() && self.skipped.is_empty()
  }

  /// Total number of edges accounted for.
  pub fn total(&self) -> usize {
    self.completed.len() + self.failed.iter().count() + self.skipped.len()
  }
}
