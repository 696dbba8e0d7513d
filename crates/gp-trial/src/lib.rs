//! # gp-trial
//!
//! Trial execution for GridPilot.
//!
//! A trial is one invocation of the external training command for a concrete
//! parameter combination. The [`TrialRunner`] trait abstracts over the three
//! transports (local subprocess, ssh remote shell, interactive remote
//! session); all of them build the same command line and extract the score
//! from the same cross-validation marker in the command's output.

mod command;
mod error;
mod local;
mod remote;
mod runner;
mod session;

pub use command::{parse_score, TrialCommand, SCORE_MARKER};
pub use error::TrialError;
pub use local::LocalRunner;
pub use remote::SshRunner;
pub use runner::TrialRunner;
pub use session::{SessionCredentials, SessionRunner, SessionState};
