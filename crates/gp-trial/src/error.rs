use thiserror::Error;

/// Errors surfaced by trial execution.
///
/// Every variant is a per-job failure: the worker that hit it logs the
/// error, requeues its job, and exits. None of these abort the sweep.
#[derive(Debug, Error)]
pub enum TrialError {
    #[error("failed to spawn trial command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("trial command exited with status {status}: {stderr}")]
    Exit { status: i32, stderr: String },

    #[error("trial output contained no cross-validation score line")]
    MissingScore,

    #[error("could not parse score token {token:?}")]
    ScoreParse { token: String },

    #[error("session i/o error: {0}")]
    SessionIo(#[from] std::io::Error),

    #[error("login to {host} failed: {message}")]
    LoginFailed { host: String, message: String },

    #[error("timed out waiting for {waiting_for:?}")]
    Timeout { waiting_for: String },

    #[error("session is not ready")]
    SessionClosed,
}
