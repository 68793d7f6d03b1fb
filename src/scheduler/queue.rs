use std::collections::VecDeque;
use std::sync::Arc;

use crate::scheduler::job::{Job, JobId};

/// FIFO queue of submitted-but-not-yet-started jobs.
///
/// A job present here has not been assigned a worker. Removal by id is
/// the queued-branch of cancellation: the job simply never runs.
pub(crate) struct WorkQueue<T> {
    jobs: VecDeque<Arc<Job<T>>>,
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            jobs: VecDeque::new(),
        }
    }

    pub fn push(&mut self, job: Arc<Job<T>>) {
        self.jobs.push_back(job);
    }

    pub fn pop(&mut self) -> Option<Arc<Job<T>>> {
        self.jobs.pop_front()
    }

    /// Remove a queued job by id, preserving the order of the rest.
    pub fn remove(&mut self, id: &JobId) -> Option<Arc<Job<T>>> {
        let pos = self.jobs.iter().position(|job| job.id() == *id)?;
        self.jobs.remove(pos)
    }

    /// Take every queued job, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Arc<Job<T>>> {
        self.jobs.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }
}
