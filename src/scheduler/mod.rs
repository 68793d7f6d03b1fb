//! The scheduler core: worker-pool lifecycle, registry bookkeeping, and
//! the cancellation protocol.
//!
//! One coordination lock protects the work queue and the registry, which
//! is what keeps the queued-vs-running cancellation branches mutually
//! exclusive: a job is either still in the queue (remove it, it never
//! runs) or already claimed by a worker (cancel its token).

pub mod job;
mod queue;
mod registry;
mod worker;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::config::PoolConfig;
use crate::dispatch::{self, DeliveryContext, EventDispatcher};
use crate::error::{Result, SchedulerError};
use crate::scheduler::job::{Job, JobId, JobStatus};
use crate::scheduler::queue::WorkQueue;
use crate::scheduler::registry::JobRegistry;

/// Point-in-time pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    /// Jobs waiting in the FIFO queue
    pub queued: usize,
    /// Jobs currently executing on a worker
    pub running: usize,
    /// Live worker tasks (core + extra)
    pub workers: usize,
}

struct State<T> {
    queue: WorkQueue<T>,
    registry: JobRegistry<T>,
    /// Live worker tasks
    workers: usize,
    /// Jobs currently executing
    running: usize,
}

pub(crate) struct Inner<T> {
    pub(crate) config: PoolConfig,
    state: Mutex<State<T>>,
    pub(crate) notify: Notify,
    pub(crate) shutdown: CancellationToken,
    pub(crate) dispatcher: EventDispatcher<T>,
    next_worker_id: AtomicU64,
}

impl<T: Send + 'static> Inner<T> {
    fn lock_state(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_worker(self: &Arc<Self>, core: bool) {
        let worker_id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
        tokio::spawn(worker::worker_loop(Arc::clone(self), worker_id, core));
    }

    /// Claim the next queued job for a worker. Marks it running under the
    /// coordination lock so no cancel call can observe it half-claimed.
    pub(crate) fn next_job(&self, worker_id: u64) -> Option<Arc<Job<T>>> {
        let mut state = self.lock_state();
        let job = state.queue.pop()?;
        job.mark_running(worker_id);
        state.running += 1;
        Some(job)
    }

    pub(crate) fn release_slot(&self) {
        self.lock_state().running -= 1;
    }

    pub(crate) fn worker_exited(&self) {
        self.lock_state().workers -= 1;
    }

    /// Decide a job's terminal outcome under the coordination lock:
    /// either cancellation won while the task ran (registry entry already
    /// gone, returns `false`) or the job finishes now and its entry is
    /// removed exactly once.
    pub(crate) fn job_finished(&self, job: &Job<T>) -> bool {
        let mut state = self.lock_state();
        if job.cancel_token().is_cancelled() {
            return false;
        }
        state.registry.remove(&job.id());
        true
    }
}

/// Bounded-concurrency job scheduler.
///
/// Owns a pool of worker tasks pulling from one FIFO queue and a registry
/// of in-flight jobs. Cheap to clone; all clones share the same pool.
/// Construct one per process at startup and pass handles to callers.
pub struct JobScheduler<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for JobScheduler<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> JobScheduler<T> {
    /// Create a scheduler and the delivery context its callbacks are
    /// marshaled to. Core workers are spawned immediately, so this must
    /// be called from within a tokio runtime.
    pub fn new(config: PoolConfig) -> (Self, DeliveryContext<T>) {
        let (dispatcher, delivery) = dispatch::channel();
        let inner = Arc::new(Inner {
            state: Mutex::new(State {
                queue: WorkQueue::new(),
                registry: JobRegistry::new(),
                workers: config.core_workers,
                running: 0,
            }),
            config,
            notify: Notify::new(),
            shutdown: CancellationToken::new(),
            dispatcher,
            next_worker_id: AtomicU64::new(1),
        });

        for _ in 0..inner.config.core_workers {
            inner.spawn_worker(true);
        }

        tracing::info!(
            core_workers = inner.config.core_workers,
            max_workers = inner.config.max_workers,
            "scheduler started"
        );

        (Self { inner }, delivery)
    }

    /// Register and enqueue a job, returning its id immediately. The job
    /// waits in FIFO order if the pool is saturated.
    pub fn submit(&self, job: Job<T>) -> Result<JobId> {
        if self.inner.shutdown.is_cancelled() {
            return Err(SchedulerError::ShutDown);
        }

        let id = job.id();
        let job = Arc::new(job);

        let (spawn_extra, in_flight) = {
            let mut state = self.inner.lock_state();
            state.registry.insert(Arc::clone(&job));
            state.queue.push(job);

            // Grow the pool when the backlog exceeds the idle workers.
            let idle = state.workers - state.running;
            let grow =
                state.queue.len() > idle && state.workers < self.inner.config.max_workers;
            if grow {
                state.workers += 1;
            }
            (grow, state.registry.len())
        };

        self.inner.notify.notify_one();
        if spawn_extra {
            self.inner.spawn_worker(false);
        }

        tracing::info!(job_id = %id, in_flight, "job submitted");
        Ok(id)
    }

    /// Cancel one job. Queued jobs are dequeued and never run (no
    /// callback fires); running jobs get their cancellation token
    /// signalled and deliver no terminal callback. Unknown ids are a
    /// no-op, so this is safe to call speculatively.
    pub fn cancel(&self, id: JobId) {
        let mut state = self.inner.lock_state();
        let Some(job) = state.registry.remove(&id) else {
            return;
        };

        if state.queue.remove(&id).is_some() {
            tracing::info!(job_id = %id, "queued job cancelled");
            return;
        }

        job.cancel_token().cancel();
        tracing::info!(job_id = %id, worker_id = ?job.worker(), "running job cancelled");
    }

    /// Cancel every in-flight job, pending and running alike.
    pub fn cancel_all(&self) {
        let mut state = self.inner.lock_state();

        let queued = state.queue.drain();
        for job in &queued {
            state.registry.remove(&job.id());
        }

        let running = state.registry.drain();
        for job in &running {
            job.cancel_token().cancel();
        }

        tracing::info!(
            queued = queued.len(),
            running = running.len(),
            "all jobs cancelled"
        );
    }

    /// Drain the work queue, discarding jobs that have not started.
    /// Running jobs are left untouched and complete normally.
    pub fn cancel_all_pending(&self) {
        let mut state = self.inner.lock_state();
        let drained = state.queue.drain();
        for job in &drained {
            state.registry.remove(&job.id());
        }
        tracing::info!(count = drained.len(), "pending jobs cancelled");
    }

    /// Status of an in-flight job. `None` once the job has finished or
    /// been cancelled.
    pub fn job_status(&self, id: JobId) -> Option<JobStatus> {
        self.inner
            .lock_state()
            .registry
            .get(&id)
            .map(|job| job.status())
    }

    pub fn stats(&self) -> SchedulerStats {
        let state = self.inner.lock_state();
        SchedulerStats {
            queued: state.queue.len(),
            running: state.running,
            workers: state.workers,
        }
    }

    /// Cancel everything and stop the worker pool. Idempotent. Workers
    /// finish observing their tokens and exit; further submits fail with
    /// [`SchedulerError::ShutDown`].
    pub fn shutdown(&self) {
        self.cancel_all();
        self.inner.shutdown.cancel();
        self.inner.notify.notify_waiters();
        tracing::info!("scheduler shut down");
    }
}
