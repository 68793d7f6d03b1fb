use std::time::Duration;

/// Worker-pool sizing for a [`JobScheduler`](crate::JobScheduler).
///
/// Core workers are spawned at construction and live until shutdown.
/// When a submission finds every live worker busy and the pool below
/// `max_workers`, an extra worker is spawned; an extra worker that sits
/// idle for `keep_alive` retires.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of workers kept alive for the scheduler's whole lifetime
    pub core_workers: usize,
    /// Upper bound on concurrently live workers
    pub max_workers: usize,
    /// How long an extra (non-core) worker waits for work before retiring
    pub keep_alive: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            core_workers: 2,
            max_workers: 8,
            keep_alive: Duration::from_secs(1),
        }
    }
}

impl PoolConfig {
    pub fn new(core_workers: usize, max_workers: usize) -> Self {
        Self {
            core_workers,
            max_workers,
            ..Default::default()
        }
    }

    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }
}
