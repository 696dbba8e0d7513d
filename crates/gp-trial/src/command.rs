//! Construction of the external training command and score extraction.

use gp_grid::Job;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::TrialError;

/// Marker identifying the cross-validation result line in trainer output,
/// e.g. `Cross Validation Mean squared error = 0.0130758`. The score is the
/// final whitespace-separated token of that line.
pub const SCORE_MARKER: &str = "Cross";

/// Everything needed to build the training command for one job. Shared by
/// all worker transports; immutable for the lifetime of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialCommand {
    /// Path to the trainer executable.
    pub trainer: PathBuf,
    /// Path to the labeled dataset.
    pub dataset: PathBuf,
    /// Cross-validation fold count.
    pub fold: u32,
    /// Extra arguments forwarded to the trainer unmodified.
    pub extra_args: Vec<String>,
}

impl TrialCommand {
    pub fn new(trainer: impl Into<PathBuf>, dataset: impl Into<PathBuf>, fold: u32) -> Self {
        Self {
            trainer: trainer.into(),
            dataset: dataset.into(),
            fold,
            extra_args: Vec::new(),
        }
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Render the shell line for one job. Exponents are converted to
    /// concrete magnitudes (`value = 2^exponent`); disabled axes contribute
    /// no flag and the trainer falls back to its own default.
    pub fn shell_line(&self, job: &Job) -> String {
        let mut line = format!("{} -s 3", self.trainer.display());
        if let Some(c) = job.c {
            line.push_str(&format!(" -c {}", 2f64.powf(c)));
        }
        if let Some(g) = job.g {
            line.push_str(&format!(" -g {}", 2f64.powf(g)));
        }
        if let Some(p) = job.p {
            line.push_str(&format!(" -p {}", 2f64.powf(p)));
        }
        line.push_str(&format!(" -v {}", self.fold));
        for arg in &self.extra_args {
            line.push(' ');
            line.push_str(arg);
        }
        line.push(' ');
        line.push_str(&self.dataset.display().to_string());
        line
    }
}

/// Extract the cross-validation score from captured trainer output: the
/// last token of the first line carrying [`SCORE_MARKER`].
pub fn parse_score(output: &str) -> Result<f64, TrialError> {
    for line in output.lines() {
        if !line.contains(SCORE_MARKER) {
            continue;
        }
        let token = line
            .split_whitespace()
            .last()
            .ok_or(TrialError::MissingScore)?;
        return token.parse().map_err(|_| TrialError::ScoreParse {
            token: token.to_string(),
        });
    }
    Err(TrialError::MissingScore)
}
