//! Best-score tracking and result aggregation.

use gp_grid::{Job, JobKey};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::progress::ProgressSink;
use crate::resume::ResumeLedger;
use crate::worker::WorkerReport;

/// The best `(job, score)` seen so far. Lower scores win; replacement
/// happens only on strict improvement, so ties keep the earliest
/// observation and the outcome is stable under arrival order.
#[derive(Debug, Default)]
pub struct BestState {
    best: Option<(Job, f64)>,
}

impl BestState {
    /// Returns whether `score` became the new best.
    pub fn observe(&mut self, job: Job, score: f64) -> bool {
        if score.is_nan() {
            return false;
        }
        match self.best {
            Some((_, current)) if score >= current => false,
            _ => {
                self.best = Some((job, score));
                true
            }
        }
    }

    pub fn best(&self) -> Option<&(Job, f64)> {
        self.best.as_ref()
    }
}

/// Single-threaded consumer of trial results.
///
/// Workers report in arrival order; the engine re-sequences by blocking on
/// each planned job until this aggregator has seen it. Every accepted fresh
/// result is persisted immediately and echoed to stdout with the running
/// best, mirroring what the progress file will say on resume.
pub struct ResultAggregator {
    best: BestState,
    done: HashMap<JobKey, f64>,
    sink: Box<dyn ProgressSink>,
}

impl ResultAggregator {
    pub fn new(sink: Box<dyn ProgressSink>) -> Self {
        Self {
            best: BestState::default(),
            done: HashMap::new(),
            sink,
        }
    }

    /// Fold a prior run's results in. They count toward completion and the
    /// best score but are never re-persisted.
    pub fn seed_resumed(&mut self, ledger: &ResumeLedger) {
        for (job, score) in ledger.iter() {
            self.done.insert(job.key(), *score);
            self.best.observe(*job, *score);
            self.report_line("resumed", job, *score);
        }
    }

    /// Accept one fresh worker report.
    pub fn accept(&mut self, report: WorkerReport) {
        let key = report.job.key();
        if self.done.contains_key(&key) {
            debug!(worker = %report.worker, job = %report.job, "duplicate result dropped");
            return;
        }
        self.done.insert(key, report.score);
        self.best.observe(report.job, report.score);

        if let Err(error) = self.sink.record(&report.job, report.score) {
            warn!(error = %error, "failed to persist progress line; continuing");
        }
        self.report_line(&report.worker, &report.job, report.score);
    }

    pub fn is_done(&self, key: &JobKey) -> bool {
        self.done.contains_key(key)
    }

    pub fn completed(&self) -> usize {
        self.done.len()
    }

    pub fn best(&self) -> Option<&(Job, f64)> {
        self.best.best()
    }

    fn report_line(&self, worker: &str, job: &Job, score: f64) {
        println!(
            "[{worker}] {job} score={score} (best {})",
            best_summary(self.best.best())
        );
    }
}

/// Human-readable running best with exponents converted to magnitudes.
fn best_summary(best: Option<&(Job, f64)>) -> String {
    let Some((job, score)) = best else {
        return "none".to_string();
    };
    let mut out = String::new();
    if let Some(c) = job.c {
        out.push_str(&format!("c={}, ", 2f64.powf(c)));
    }
    if let Some(g) = job.g {
        out.push_str(&format!("g={}, ", 2f64.powf(g)));
    }
    if let Some(p) = job.p {
        out.push_str(&format!("p={}, ", 2f64.powf(p)));
    }
    out.push_str(&format!("score={score}"));
    out
}
