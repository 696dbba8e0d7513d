//! Remote shell transport over non-interactive ssh.

use async_trait::async_trait;
use gp_grid::Job;
use std::path::PathBuf;

use crate::command::TrialCommand;
use crate::error::TrialError;
use crate::local::run_shell;
use crate::runner::TrialRunner;

/// Runs each trial on a remote host via `ssh`, in the same working
/// directory the sweep was launched from. Assumes key-based authentication
/// and a shared view of the dataset path (e.g. a network filesystem).
pub struct SshRunner {
    host: String,
    cwd: PathBuf,
    command: TrialCommand,
}

impl SshRunner {
    pub fn new(host: impl Into<String>, command: TrialCommand) -> std::io::Result<Self> {
        Ok(Self {
            host: host.into(),
            cwd: std::env::current_dir()?,
            command,
        })
    }

    fn remote_line(&self, job: &Job) -> String {
        format!(
            "ssh -x -t -t {} \"cd {}; {}\"",
            self.host,
            self.cwd.display(),
            self.command.shell_line(job)
        )
    }
}

#[async_trait]
impl TrialRunner for SshRunner {
    fn identity(&self) -> &str {
        &self.host
    }

    async fn run_trial(&mut self, job: &Job) -> Result<f64, TrialError> {
        run_shell(&self.remote_line(job)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_the_command_for_the_remote_host() {
        let runner = SshRunner::new("node7", TrialCommand::new("./svm-train", "data", 5)).unwrap();
        let line = runner.remote_line(&Job::new(Some(1.0), None, None));
        assert!(line.starts_with("ssh -x -t -t node7 \"cd "));
        assert!(line.ends_with("; ./svm-train -s 3 -c 2 -v 5 data\""));
        assert_eq!(runner.identity(), "node7");
    }
}
