//! Marshals job events from worker tasks onto one delivery context.
//!
//! Workers dispatch tagged events onto an unbounded channel; the
//! [`DeliveryContext`] drains that channel sequentially and invokes the
//! matching [`TaskCallback`] method. The single channel plus single
//! consumer is what gives the per-job start-before-terminal ordering
//! guarantee.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::scheduler::job::JobId;
use crate::task::{TaskCallback, TaskError};

pub(crate) enum EventKind<T> {
    Started,
    Succeeded(T),
    Failed(TaskError),
}

pub(crate) struct JobEvent<T> {
    pub job_id: JobId,
    pub callback: Arc<dyn TaskCallback<T>>,
    pub kind: EventKind<T>,
}

pub(crate) fn channel<T>() -> (EventDispatcher<T>, DeliveryContext<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventDispatcher { tx }, DeliveryContext { rx })
}

/// Sending half, shared by the scheduler's workers.
pub(crate) struct EventDispatcher<T> {
    tx: mpsc::UnboundedSender<JobEvent<T>>,
}

impl<T> EventDispatcher<T> {
    /// Post an event for the delivery context. If the context is gone
    /// (receiver dropped), the event is silently discarded.
    pub(crate) fn dispatch(&self, event: JobEvent<T>) {
        if self.tx.send(event).is_err() {
            tracing::trace!("delivery context gone, event dropped");
        }
    }
}

/// The single-threaded sink all callback invocations are marshaled to.
///
/// Drive it from wherever callbacks should land: either hand it to the
/// runtime with [`spawn`](DeliveryContext::spawn), or await
/// [`run`](DeliveryContext::run) on a dedicated task or event loop of
/// your own. Dropping it without running it turns all callback delivery
/// into a no-op.
pub struct DeliveryContext<T> {
    rx: mpsc::UnboundedReceiver<JobEvent<T>>,
}

impl<T: Send + 'static> DeliveryContext<T> {
    /// Drain events until every dispatcher handle is gone.
    pub async fn run(mut self) {
        while let Some(event) = self.rx.recv().await {
            match event.kind {
                EventKind::Started => {
                    tracing::debug!(job_id = %event.job_id, "delivering on_start");
                    event.callback.on_start();
                }
                EventKind::Succeeded(value) => {
                    tracing::debug!(job_id = %event.job_id, "delivering on_success");
                    event.callback.on_success(value);
                }
                EventKind::Failed(error) => {
                    tracing::debug!(job_id = %event.job_id, "delivering on_failure");
                    event.callback.on_failure(error);
                }
            }
        }
    }

    /// Run the delivery loop on its own task.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
