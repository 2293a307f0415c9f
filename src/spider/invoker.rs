//! Running the crawler as a child process.

use std::io;
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::spider::command::SpiderCommand;

/// How a crawler run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Exit code zero.
    Success {
        /// Captured standard output.
        stdout: String,
    },
    /// The executable could not be found.
    NotFound,
    /// Non-zero exit.
    Failed {
        /// Exit code, or the negated signal number if the process was killed.
        exit_code: i32,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },
    /// The run exceeded the configured limit and was killed.
    TimedOut {
        /// The limit that was exceeded.
        after: Duration,
    },
    /// The process could not be started or waited on for another reason.
    SpawnFailed {
        /// The OS error.
        message: String,
    },
}

/// Runs `command` to completion and classifies the result.
///
/// Blocks the calling task until the process exits or `timeout` elapses.
/// On timeout the child is killed.
pub async fn run(command: &SpiderCommand, timeout: Option<Duration>) -> Outcome {
    info!(command = %command, "Executing command");

    let child = Command::new(command.program())
        .args(command.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match child {
        Ok(child) => child,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            error!(program = command.program(), "Executable not found");
            return Outcome::NotFound;
        }
        Err(e) => {
            error!(program = command.program(), error = %e, "Failed to start process");
            return Outcome::SpawnFailed {
                message: e.to_string(),
            };
        }
    };

    let waited = match timeout {
        Some(limit) => {
            if let Ok(result) = tokio::time::timeout(limit, child.wait_with_output()).await {
                result
            } else {
                warn!(
                    program = command.program(),
                    timeout_secs = limit.as_secs(),
                    "Process timed out and was killed"
                );
                return Outcome::TimedOut { after: limit };
            }
        }
        None => child.wait_with_output().await,
    };

    match waited {
        Ok(output) => classify(&output),
        Err(e) => {
            error!(program = command.program(), error = %e, "Failed to wait for process");
            Outcome::SpawnFailed {
                message: e.to_string(),
            }
        }
    }
}

/// Maps a finished process to an [`Outcome`], logging its output.
pub(crate) fn classify(output: &Output) -> Outcome {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if output.status.success() {
        info!(stdout = %stdout, "Process completed successfully");
        if !stderr.is_empty() {
            debug!(stderr = %stderr, "Process wrote to stderr");
        }
        return Outcome::Success { stdout };
    }

    let exit_code = exit_code(output.status);
    error!(exit_code, "Process exited with failure");
    error!(stdout = %stdout, "STDOUT");
    error!(stderr = %stderr, "STDERR");

    Outcome::Failed {
        exit_code,
        stdout,
        stderr,
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or_else(|| signal_exit_code(status))
}

#[cfg(unix)]
fn signal_exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status.signal().map_or(-1, |signal| -signal)
}

#[cfg(not(unix))]
const fn signal_exit_code(_status: ExitStatus) -> i32 {
    -1
}
