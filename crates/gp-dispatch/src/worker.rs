//! The worker loop shared by every transport.

use gp_grid::Job;
use gp_trial::TrialRunner;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::queue::{Dispatch, WorkQueue};

/// A scored job as reported by one worker.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub worker: String,
    pub job: Job,
    pub score: f64,
}

/// Pull jobs until shutdown, running each through the injected transport.
///
/// Failure policy: a worker that cannot complete a trial re-fronts the job
/// for a sibling and exits, rather than retrying itself — a broken host
/// would otherwise burn through the queue failing everything it touches.
/// Dropping the report sender on exit is what lets the engine detect a
/// fully starved pool.
pub async fn worker_loop(
    queue: Arc<WorkQueue>,
    reports: UnboundedSender<WorkerReport>,
    mut runner: Box<dyn TrialRunner>,
) {
    let worker = runner.identity().to_string();

    if let Err(error) = runner.connect().await {
        warn!(worker = %worker, error = %error, "worker failed to connect; exiting");
        return;
    }

    loop {
        match queue.pop().await {
            Dispatch::Shutdown => {
                // Re-front the marker so every sibling sees it too.
                queue.signal_shutdown();
                let _ = runner.close().await;
                debug!(worker = %worker, "worker stopped");
                break;
            }
            Dispatch::Run(job) => match runner.run_trial(&job).await {
                Ok(score) => {
                    let report = WorkerReport {
                        worker: worker.clone(),
                        job,
                        score,
                    };
                    if reports.send(report).is_err() {
                        // Aggregator is gone; nothing left to work for.
                        break;
                    }
                }
                Err(error) => {
                    warn!(
                        worker = %worker,
                        job = %job,
                        error = %error,
                        "trial failed; job requeued for a sibling"
                    );
                    queue.push_front(job);
                    let _ = runner.close().await;
                    break;
                }
            },
        }
    }
}
