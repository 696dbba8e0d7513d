//! # gp-dispatch
//!
//! Grid dispatch and worker coordination for GridPilot.
//!
//! Owns the retry-capable work queue, the resume ledger, incremental
//! progress persistence, best-score aggregation, and the sweep engine that
//! wires a pool of [`gp_trial::TrialRunner`]s to the queue and re-sequences
//! their out-of-order results.

mod aggregate;
mod engine;
mod error;
mod progress;
mod queue;
mod resume;
mod worker;

pub use aggregate::{BestState, ResultAggregator};
pub use engine::{run_sweep, SweepOutcome};
pub use error::DispatchError;
pub use progress::{FileProgress, NullProgress, ProgressSink};
pub use queue::{Dispatch, WorkQueue};
pub use resume::ResumeLedger;
pub use worker::{worker_loop, WorkerReport};
