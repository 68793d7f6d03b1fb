use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::task::{Task, TaskCallback, TaskError};

/// Opaque job identifier, assigned at [`Job::new`] and stable for the
/// job's lifetime. Used as the registry key and as the handle for
/// cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::NotStarted => write!(f, "not_started"),
            JobStatus::InProgress => write!(f, "in_progress"),
            JobStatus::Completed => write!(f, "completed"),
        }
    }
}

/// The schedulable unit: one [`Task`] paired with one [`TaskCallback`],
/// plus lifecycle bookkeeping.
///
/// A job is shared between the scheduler (registry, cancellation) and at
/// most one worker (execution). The worker that dequeues it is recorded
/// exactly once, under the scheduler's coordination lock, and is
/// read-only thereafter.
pub struct Job<T> {
    id: JobId,
    status: Mutex<JobStatus>,
    worker: OnceLock<u64>,
    cancel: CancellationToken,
    created_at: DateTime<Utc>,
    task: Box<dyn Task<Output = T>>,
    callback: Arc<dyn TaskCallback<T>>,
}

impl<T: Send + 'static> Job<T> {
    pub fn new(task: impl Task<Output = T>, callback: impl TaskCallback<T>) -> Self {
        Self {
            id: JobId(Uuid::new_v4()),
            status: Mutex::new(JobStatus::NotStarted),
            worker: OnceLock::new(),
            cancel: CancellationToken::new(),
            created_at: Utc::now(),
            task: Box::new(task),
            callback: Arc::new(callback),
        }
    }

    pub(crate) async fn execute(&self) -> Result<T, TaskError> {
        self.task.execute(self.cancel.clone()).await
    }
}

impl<T> Job<T> {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn status(&self) -> JobStatus {
        *self
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Id of the worker executing this job, if execution has begun.
    pub fn worker(&self) -> Option<u64> {
        self.worker.get().copied()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn callback(&self) -> Arc<dyn TaskCallback<T>> {
        Arc::clone(&self.callback)
    }

    /// Called by the dequeuing worker, under the scheduler lock.
    pub(crate) fn mark_running(&self, worker_id: u64) {
        // Set-once invariant: a job is never dequeued twice.
        let _ = self.worker.set(worker_id);
        *self
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = JobStatus::InProgress;
    }

    pub(crate) fn mark_completed(&self) {
        *self
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = JobStatus::Completed;
    }
}
