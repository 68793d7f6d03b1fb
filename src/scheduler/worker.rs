use std::sync::Arc;

use crate::dispatch::{EventKind, JobEvent};
use crate::scheduler::job::Job;
use crate::scheduler::Inner;

/// Pull-execute loop run by every worker task.
///
/// Core workers wait indefinitely for work; extra workers retire after
/// sitting idle for the pool's keep-alive interval. Both exit on
/// scheduler shutdown.
pub(crate) async fn worker_loop<T: Send + 'static>(inner: Arc<Inner<T>>, worker_id: u64, core: bool) {
    tracing::debug!(worker_id, core, "worker started");

    loop {
        // Register interest before checking the queue so a submit landing
        // in between leaves a stored permit instead of a lost wakeup.
        let notified = inner.notify.notified();
        tokio::pin!(notified);

        if let Some(job) = inner.next_job(worker_id) {
            execute_job(&inner, worker_id, job).await;
            inner.release_slot();
            continue;
        }

        if inner.shutdown.is_cancelled() {
            break;
        }

        if core {
            tokio::select! {
                _ = &mut notified => {}
                _ = inner.shutdown.cancelled() => break,
            }
        } else {
            tokio::select! {
                _ = &mut notified => {}
                _ = inner.shutdown.cancelled() => break,
                _ = tokio::time::sleep(inner.config.keep_alive) => {
                    tracing::debug!(worker_id, "idle worker retiring");
                    break;
                }
            }
        }
    }

    inner.worker_exited();
    tracing::debug!(worker_id, "worker stopped");
}

/// The per-job execution sequence: start event, run the task, then
/// either discard (cancelled), succeed, or fail.
///
/// A task may finish just as cancellation lands; whichever happened, the
/// post-execution token check decides, and a cancelled job delivers no
/// terminal callback.
async fn execute_job<T: Send + 'static>(inner: &Arc<Inner<T>>, worker_id: u64, job: Arc<Job<T>>) {
    tracing::debug!(job_id = %job.id(), worker_id, "job picked up");

    inner.dispatcher.dispatch(JobEvent {
        job_id: job.id(),
        callback: job.callback(),
        kind: EventKind::Started,
    });

    // Cancellation that raced the dequeue: stop before touching the task.
    if job.cancel_token().is_cancelled() {
        tracing::debug!(job_id = %job.id(), "job cancelled before execution");
        return;
    }

    let result = job.execute().await;

    // Registry removal happens before the terminal event is dispatched,
    // on the failure path as well as the success path. A cancellation
    // that won the race means no terminal callback at all.
    if !inner.job_finished(&job) {
        tracing::debug!(job_id = %job.id(), "job cancelled, result discarded");
        job.mark_completed();
        return;
    }
    job.mark_completed();

    match result {
        Ok(value) => {
            tracing::info!(job_id = %job.id(), worker_id, "job completed");
            inner.dispatcher.dispatch(JobEvent {
                job_id: job.id(),
                callback: job.callback(),
                kind: EventKind::Succeeded(value),
            });
        }
        Err(error) => {
            tracing::warn!(job_id = %job.id(), worker_id, error = %error, "job failed");
            inner.dispatcher.dispatch(JobEvent {
                job_id: job.id(),
                callback: job.callback(),
                kind: EventKind::Failed(error),
            });
        }
    }
}
