use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a sweep.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Grid(#[from] gp_grid::GridError),

    #[error("could not read resume file {path}: {source}")]
    ResumeUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not open progress file {path}: {source}")]
    ProgressOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no workers configured but {pending} job(s) need to run")]
    NoWorkers { pending: usize },

    #[error("all workers exited with {pending} job(s) still pending")]
    Starved { pending: usize },
}
