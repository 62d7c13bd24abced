use thiserror::Error;

/// Errors that can occur while registering a scheduled job.
///
/// All of these are recovered locally: a failed registration leaves the
/// registry untouched and never fires anything. No failure here is retried —
/// a malformed expression or a taken name would fail the same way again.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The cron expression failed to parse.
    #[error("Invalid cron expression: {expression}: {reason}")]
    InvalidCronExpression { expression: String, reason: String },

    /// A job with this name is already registered; the existing job is left
    /// untouched.
    #[error("Job already registered: {name}")]
    DuplicateJobName { name: String },

    /// The IANA zone name is not known to the timezone database.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
