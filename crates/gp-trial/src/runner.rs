//! The worker-side trial execution interface.

use async_trait::async_trait;
use gp_grid::Job;

use crate::error::TrialError;

/// One trial-execution transport.
///
/// Implementations may spawn a local subprocess, wrap the command for a
/// remote shell, or drive a persistent interactive session (see
/// [`crate::SessionRunner`]). The worker loop composes against this trait
/// only, so transports stay interchangeable.
#[async_trait]
pub trait TrialRunner: Send {
    /// Label used in diagnostics and result lines (hostname, `local-0`, …).
    fn identity(&self) -> &str;

    /// One-time setup before the first trial, e.g. an interactive login.
    async fn connect(&mut self) -> Result<(), TrialError> {
        Ok(())
    }

    /// Execute one trial and return its cross-validation score.
    async fn run_trial(&mut self, job: &Job) -> Result<f64, TrialError>;

    /// Graceful teardown once the worker observes shutdown.
    async fn close(&mut self) -> Result<(), TrialError> {
        Ok(())
    }
}
