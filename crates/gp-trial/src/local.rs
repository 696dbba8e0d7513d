//! Local subprocess transport.

use async_trait::async_trait;
use gp_grid::Job;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::command::{parse_score, TrialCommand};
use crate::error::TrialError;
use crate::runner::TrialRunner;

/// Runs each trial as a local `sh -c` subprocess and reads the score from
/// its captured standard output.
pub struct LocalRunner {
    name: String,
    command: TrialCommand,
}

impl LocalRunner {
    pub fn new(index: usize, command: TrialCommand) -> Self {
        Self {
            name: format!("local-{index}"),
            command,
        }
    }
}

#[async_trait]
impl TrialRunner for LocalRunner {
    fn identity(&self) -> &str {
        &self.name
    }

    async fn run_trial(&mut self, job: &Job) -> Result<f64, TrialError> {
        run_shell(&self.command.shell_line(job)).await
    }
}

/// Spawn a shell line, capture its output, and extract the score. Shared by
/// the local and remote-shell transports.
pub(crate) async fn run_shell(line: &str) -> Result<f64, TrialError> {
    debug!(command = %line, "spawning trial");

    let child = Command::new("sh")
        .arg("-c")
        .arg(line)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(TrialError::Spawn)?;

    let output = child.wait_with_output().await.map_err(TrialError::Spawn)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TrialError::Exit {
            status: output.status.code().unwrap_or(-1),
            stderr: stderr.lines().last().unwrap_or("").to_string(),
        });
    }

    parse_score(&String::from_utf8_lossy(&output.stdout))
}
