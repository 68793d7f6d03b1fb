use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("scheduler has been shut down")]
    ShutDown,
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
