use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Error produced by a failing [`Task`], delivered verbatim to
/// [`TaskCallback::on_failure`].
pub type TaskError = Box<dyn std::error::Error + Send + Sync>;

/// A caller-supplied unit of work.
///
/// The task receives a [`CancellationToken`] and must observe it at
/// blocking points (e.g., inside a `tokio::select!` around a sleep or an
/// I/O call). Cancellation is cooperative: a task that ignores the token
/// runs to completion, but its result is discarded once the token is
/// cancelled.
#[async_trait]
pub trait Task: Send + Sync + 'static {
    type Output: Send + 'static;

    async fn execute(&self, cancel: CancellationToken) -> Result<Self::Output, TaskError>;
}

/// A caller-supplied sink for job notifications.
///
/// All three methods are invoked on the scheduler's single delivery
/// context, never concurrently for the same job. `on_start` always
/// precedes the terminal callback; a cancelled job receives no terminal
/// callback at all.
pub trait TaskCallback<T>: Send + Sync + 'static {
    fn on_start(&self);

    fn on_success(&self, value: T);

    fn on_failure(&self, error: TaskError);
}
