//! Parsing of prior progress files for resumption.

use gp_grid::{Job, JobKey};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::error::DispatchError;

/// Completed results recovered from a previous run's progress file.
///
/// A line contributes a result only if it carries a `score=` token; any
/// subset of the `c=`/`g=`/`p=` tokens may be present, and a missing one
/// means that axis was disabled when the line was written. When the same
/// combination appears more than once, the last line wins.
#[derive(Debug, Default)]
pub struct ResumeLedger {
    entries: HashMap<JobKey, (Job, f64)>,
}

impl ResumeLedger {
    /// Read and parse a progress file. An unreadable file is fatal: the
    /// caller asked to resume from it, so silently starting over would
    /// discard paid-for work.
    pub fn load(path: &Path) -> Result<Self, DispatchError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            DispatchError::ResumeUnreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();

        for (index, line) in text.lines().enumerate() {
            let mut score = None;
            let (mut c, mut g, mut p) = (None, None, None);

            for token in line.split_whitespace() {
                let Some((key, value)) = token.split_once('=') else {
                    continue;
                };
                let Ok(value) = value.parse::<f64>() else {
                    continue;
                };
                match key {
                    "score" => score = Some(value),
                    "c" => c = Some(value),
                    "g" => g = Some(value),
                    "p" => p = Some(value),
                    _ => {}
                }
            }

            match score {
                Some(score) => {
                    let job = Job::new(c, g, p);
                    entries.insert(job.key(), (job, score));
                }
                None if !line.trim().is_empty() => {
                    warn!(line = index + 1, "resume line has no score token; skipped");
                }
                None => {}
            }
        }

        Self { entries }
    }

    pub fn contains(&self, key: &JobKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Job, f64)> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
