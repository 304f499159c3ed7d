//! Shell command execution for build edges.

use tokio::process::Command;
use tracing::debug;

use super::types::{CommandOutput, ExecuteError};

/// Run a single edge command via the platform shell.
///
/// The child inherits the working directory and environment. Its output is
/// captured and replayed so tool diagnostics are not swallowed; its exit
/// status is authoritative for edge success.
pub async fn run_command(cmd: &str) -> Result<CommandOutput, ExecuteError> {
  let (shell, arg) = shell_invocation();
  debug!(cmd = %cmd, shell = %shell, "spawning command");

  let output = Command::new(shell).arg(arg).arg(cmd).output().await?;

  let captured = CommandOutput {
    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
  };
  if !captured.stdout.is_empty() {
    print!("{}", captured.stdout);
  }
  if !captured.stderr.is_empty() {
    eprint!("{}", captured.stderr);
  }

  if !output.status.success() {
    return Err(ExecuteError::CmdFailed {
      cmd: cmd.to_string(),
      code: output.status.code(),
    });
  }

  Ok(captured)
}

/// The platform shell and its command flag.
fn shell_invocation() -> (&'static str, &'static str) {
  #[cfg(unix)]
  {
    ("/bin/sh", "-c")
  }

  #[cfg(windows)]
  {
    ("cmd.exe", "/C")
  }
}
