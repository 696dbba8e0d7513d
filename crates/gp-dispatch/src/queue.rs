//! The shared job queue.

use gp_grid::Job;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;

/// Message handed to a worker: either a job to run or the shutdown marker.
///
/// Shutdown is broadcast by requeue, not consumed: a worker that dequeues
/// it must re-front it (via [`WorkQueue::signal_shutdown`]) before exiting
/// so every sibling observes it too.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dispatch {
    Run(Job),
    Shutdown,
}

/// Double-ended job queue shared by all workers.
///
/// First-attempt jobs enter at the back and drain FIFO. Jobs requeued
/// after a failed trial enter at the front, so a failing combination is
/// retried by the next free worker instead of stalling behind the rest of
/// the grid; the shutdown marker uses the front for the same reason.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<Dispatch>>,
    available: Notify,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a first-attempt job.
    pub fn push_back(&self, job: Job) {
        self.items.lock().push_back(Dispatch::Run(job));
        self.available.notify_one();
    }

    /// Requeue a job at the front, ahead of all untried work.
    pub fn push_front(&self, job: Job) {
        self.items.lock().push_front(Dispatch::Run(job));
        self.available.notify_one();
    }

    /// Insert the shutdown marker at the front of the queue.
    pub fn signal_shutdown(&self) {
        self.items.lock().push_front(Dispatch::Shutdown);
        self.available.notify_one();
    }

    /// Take the next message, waiting until one is available.
    pub async fn pop(&self) -> Dispatch {
        loop {
            if let Some(message) = self.items.lock().pop_front() {
                return message;
            }
            self.available.notified().await;
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}
