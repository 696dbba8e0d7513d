//! Incremental persistence of completed trials.

use gp_grid::Job;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::error::DispatchError;

/// Sink for newly computed `(job, score)` records.
///
/// Records are flushed per call so a partial run is resumable at any point.
/// Write failures are the caller's to log; they never abort the sweep.
pub trait ProgressSink: Send {
    fn record(&mut self, job: &Job, score: f64) -> io::Result<()>;
}

/// Render one progress line in the resume-compatible shape, e.g.
/// `c=-1 g=0 score=0.013`. Exponents round-trip exactly through this
/// format because `f64` display is shortest-exact.
pub fn progress_line(job: &Job, score: f64) -> String {
    let mut line = String::new();
    if let Some(c) = job.c {
        line.push_str(&format!("c={c} "));
    }
    if let Some(g) = job.g {
        line.push_str(&format!("g={g} "));
    }
    if let Some(p) = job.p {
        line.push_str(&format!("p={p} "));
    }
    line.push_str(&format!("score={score}"));
    line
}

/// Appends progress lines to a file on disk.
pub struct FileProgress {
    file: File,
}

impl FileProgress {
    /// Start a fresh progress file, truncating any previous content.
    pub fn create(path: &Path) -> Result<Self, DispatchError> {
        let file = File::create(path).map_err(|source| DispatchError::ProgressOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { file })
    }

    /// Continue an existing progress file, keeping resumed lines intact.
    pub fn append(path: &Path) -> Result<Self, DispatchError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| DispatchError::ProgressOpen {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { file })
    }
}

impl ProgressSink for FileProgress {
    fn record(&mut self, job: &Job, score: f64) -> io::Result<()> {
        writeln!(self.file, "{}", progress_line(job, score))?;
        self.file.flush()
    }
}

/// Discards all records; used when the operator passed `--no-out`.
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn record(&mut self, _job: &Job, _score: f64) -> io::Result<()> {
        Ok(())
    }
}
