//! The sweep engine: wires the grid, the queue, the worker pool, and the
//! aggregator together for one run.

use chrono::{DateTime, Utc};
use gp_grid::GridAxes;
use gp_trial::TrialRunner;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::aggregate::ResultAggregator;
use crate::error::DispatchError;
use crate::progress::ProgressSink;
use crate::queue::WorkQueue;
use crate::resume::ResumeLedger;
use crate::worker::worker_loop;

/// Summary of a finished sweep. `best == None` is the explicit
/// nothing-ever-completed condition (e.g. an all-resumed empty grid).
#[derive(Debug, Clone, Serialize)]
pub struct SweepOutcome {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub best: Option<(gp_grid::Job, f64)>,
    /// Trials computed by this run.
    pub fresh: usize,
    /// Results folded in from the resume ledger.
    pub resumed: usize,
}

/// Run one full sweep: plan the grid, skip combinations the ledger already
/// covers, fan the rest out over `runners`, and re-sequence results until
/// every planned job is accounted for.
///
/// Results are consumed in planned order even though execution is not: the
/// engine blocks on each job's slot until a matching report arrives. Once
/// all jobs are done the shutdown marker is signalled exactly once; workers
/// broadcast it among themselves by requeueing.
pub async fn run_sweep(
    axes: &GridAxes,
    ledger: ResumeLedger,
    sink: Box<dyn ProgressSink>,
    runners: Vec<Box<dyn TrialRunner>>,
) -> Result<SweepOutcome, DispatchError> {
    let id = Uuid::new_v4();
    let started_at = Utc::now();

    let jobs = axes.plan()?;
    let mut aggregator = ResultAggregator::new(sink);
    aggregator.seed_resumed(&ledger);

    let queue = Arc::new(WorkQueue::new());
    let mut pending = 0usize;
    for job in &jobs {
        if !aggregator.is_done(&job.key()) {
            queue.push_back(*job);
            pending += 1;
        }
    }
    if pending > 0 && runners.is_empty() {
        return Err(DispatchError::NoWorkers { pending });
    }

    info!(
        sweep = %id,
        jobs = jobs.len(),
        pending,
        resumed = ledger.len(),
        workers = runners.len(),
        "sweep started"
    );

    let (reports, mut results) = mpsc::unbounded_channel();
    let mut workers = Vec::with_capacity(runners.len());
    for runner in runners {
        workers.push(tokio::spawn(worker_loop(
            queue.clone(),
            reports.clone(),
            runner,
        )));
    }
    // The engine's own sender must go away, or a fully dead pool would
    // never close the report channel.
    drop(reports);

    for job in &jobs {
        while !aggregator.is_done(&job.key()) {
            match results.recv().await {
                Some(report) => aggregator.accept(report),
                None => {
                    let still_pending = jobs
                        .iter()
                        .filter(|job| !aggregator.is_done(&job.key()))
                        .count();
                    return Err(DispatchError::Starved {
                        pending: still_pending,
                    });
                }
            }
        }
    }

    queue.signal_shutdown();
    for worker in workers {
        let _ = worker.await;
    }

    let resumed = ledger.len();
    let outcome = SweepOutcome {
        id,
        started_at,
        best: aggregator.best().copied(),
        fresh: aggregator.completed() - resumed,
        resumed,
    };
    info!(sweep = %id, fresh = outcome.fresh, resumed = outcome.resumed, "sweep complete");
    Ok(outcome)
}
