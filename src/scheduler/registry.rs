use std::collections::HashMap;
use std::sync::Arc;

use crate::scheduler::job::{Job, JobId};

/// Mapping from job id to in-flight job: exactly the jobs submitted and
/// not yet finished or cancelled.
///
/// An id appears at most once; insertion happens at submission, removal
/// exactly once, via normal completion or via cancellation.
pub(crate) struct JobRegistry<T> {
    jobs: HashMap<JobId, Arc<Job<T>>>,
}

impl<T> JobRegistry<T> {
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
        }
    }

    pub fn insert(&mut self, job: Arc<Job<T>>) {
        self.jobs.insert(job.id(), job);
    }

    /// Remove by id. Idempotent: absent ids are a no-op returning `None`.
    pub fn remove(&mut self, id: &JobId) -> Option<Arc<Job<T>>> {
        self.jobs.remove(id)
    }

    pub fn get(&self, id: &JobId) -> Option<&Arc<Job<T>>> {
        self.jobs.get(id)
    }

    pub fn drain(&mut self) -> Vec<Arc<Job<T>>> {
        self.jobs.drain().map(|(_, job)| job).collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Task, TaskCallback, TaskError};
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    struct NoopTask;

    #[async_trait]
    impl Task for NoopTask {
        type Output = String;

        async fn execute(&self, _cancel: CancellationToken) -> Result<String, TaskError> {
            Ok(String::new())
        }
    }

    struct NoopCallback;

    impl TaskCallback<String> for NoopCallback {
        fn on_start(&self) {}
        fn on_success(&self, _value: String) {}
        fn on_failure(&self, _error: TaskError) {}
    }

    fn job() -> Arc<Job<String>> {
        Arc::new(Job::new(NoopTask, NoopCallback))
    }

    #[test]
    fn insert_get_remove() {
        let mut registry = JobRegistry::new();
        let job = job();
        let id = job.id();

        registry.insert(job);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&id).is_some());

        assert!(registry.remove(&id).is_some());
        assert!(registry.get(&id).is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut registry = JobRegistry::new();
        let job = job();
        let id = job.id();
        registry.insert(job);

        assert!(registry.remove(&id).is_some());
        assert!(registry.remove(&id).is_none());
    }

    #[test]
    fn drain_returns_everything() {
        let mut registry = JobRegistry::new();
        registry.insert(job());
        registry.insert(job());

        let drained = registry.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(registry.len(), 0);
    }
}
