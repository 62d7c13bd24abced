use thiserror::Error;

/// Errors that can occur while wiring up the daily routine.
#[derive(Debug, Error)]
pub enum RoutineError {
    /// Configuration file or environment override failed to parse.
    #[error("Config error: {0}")]
    Config(#[from] figment::Error),

    /// One of the standing jobs could not be registered.
    #[error(transparent)]
    Schedule(#[from] lokebot_scheduler::SchedulerError),
}

pub type Result<T> = std::result::Result<T, RoutineError>;
