//! Out-of-process retraining.
//!
//! Training is long-running and CPU-bound, so it never runs in the serving
//! process: a configured external command consumes the canonical table and
//! writes a fresh classifier artifact. We capture its stdout/stderr and
//! exit status, enforce a generous timeout, and distinguish timeout from
//! failure. The child is killed if the server shuts down mid-train.

use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct TrainOutput {
    pub stdout: String,
    pub stderr: String,
}

pub struct Trainer {
    command: Vec<String>,
    timeout: Duration,
}

impl Trainer {
    /// `command_line` is whitespace-separated; empty means no trainer is
    /// configured on this deployment.
    pub fn new(command_line: &str, timeout: Duration) -> Self {
        Self {
            command: command_line.split_whitespace().map(str::to_string).collect(),
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.command.is_empty()
    }

    /// Run the trainer to completion and return its captured output.
    pub async fn run(&self) -> Result<TrainOutput, AppError> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(AppError::Training {
                message: "No training command configured on server".to_string(),
                stdout: String::new(),
                stderr: String::new(),
            });
        };

        tracing::info!("starting trainer: {}", self.command.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args).kill_on_drop(true);

        let output = match timeout(self.timeout, cmd.output()).await {
            Err(_) => {
                return Err(AppError::Training {
                    message: format!(
                        "Training timed out after {} seconds",
                        self.timeout.as_secs()
                    ),
                    stdout: String::new(),
                    stderr: String::new(),
                });
            }
            Ok(Err(e)) => {
                return Err(AppError::Training {
                    message: format!("Could not start trainer: {e}"),
                    stdout: String::new(),
                    stderr: String::new(),
                });
            }
            Ok(Ok(output)) => output,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            tracing::error!("trainer exited with {}: {}", output.status, stderr);
            return Err(AppError::Training {
                message: "Train failed".to_string(),
                stdout,
                stderr,
            });
        }

        tracing::info!("trainer finished");
        Ok(TrainOutput { stdout, stderr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_on_success() {
        let trainer = Trainer::new("echo trained", Duration::from_secs(5));
        let out = trainer.run().await.unwrap();
        assert_eq!(out.stdout.trim(), "trained");
    }

    #[tokio::test]
    async fn nonzero_exit_is_a_training_error() {
        let trainer = Trainer::new("false", Duration::from_secs(5));
        let err = trainer.run().await.unwrap_err();
        assert!(matches!(err, AppError::Training { .. }));
    }

    #[tokio::test]
    async fn stderr_is_captured_on_failure() {
        let trainer = Trainer::new("sh -c this-command-does-not-exist-xyz", Duration::from_secs(5));
        match trainer.run().await.unwrap_err() {
            AppError::Training { stderr, .. } => assert!(!stderr.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn timeout_is_distinguished_from_failure() {
        let trainer = Trainer::new("sleep 5", Duration::from_millis(100));
        match trainer.run().await.unwrap_err() {
            AppError::Training { message, .. } => assert!(message.contains("timed out")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_command_reports_not_configured() {
        let trainer = Trainer::new("", Duration::from_secs(1));
        assert!(!trainer.is_configured());
        match trainer.run().await.unwrap_err() {
            AppError::Training { message, .. } => assert!(message.contains("No training command")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
