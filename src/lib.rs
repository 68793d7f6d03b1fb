pub mod config;
pub mod dispatch;
pub mod error;
pub mod scheduler;
pub mod task;

pub use config::PoolConfig;
pub use dispatch::DeliveryContext;
pub use error::{Result, SchedulerError};
pub use scheduler::job::{Job, JobId, JobStatus};
pub use scheduler::{JobScheduler, SchedulerStats};
pub use task::{Task, TaskCallback, TaskError};
