//! Error types for the scheduler crate.
//!
//! Store faults are wrapped into opaque scheduling / removal failures;
//! "not found" outcomes stay distinct so callers can treat them as the
//! expected steady state they usually are.

use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

/// Errors that can occur during scheduler operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Error from the underlying tokio-cron-scheduler
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Invalid cron expression
    #[error("Invalid cron expression: {0}")]
    InvalidCron(String),

    /// Invalid timezone string
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A job could not be stored
    #[error("Failed to schedule job: {0}")]
    SchedulingFailed(String),

    /// A job or group could not be removed because of a store fault
    #[error("Failed to remove job: {0}")]
    RemovalFailed(String),

    /// Due jobs could not be read from the store
    #[error("Failed to dispatch due jobs: {0}")]
    DispatchFailed(String),

    /// Job not found in the store
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// No job belongs to the group
    #[error("Job group not found: {0}")]
    GroupNotFound(String),

    /// Payload could not be serialized or deserialized
    #[error("Payload serialization error: {0}")]
    Serialization(String),

    /// No serializer registered for a payload type
    #[error("No payload serializer registered for {0}")]
    NoSerializer(&'static str),

    /// An executor is already bound to the job name
    #[error("Executor already bound for job name: {0}")]
    DuplicateExecutor(String),

    /// Scheduler is already running
    #[error("Scheduler is already running")]
    AlreadyRunning,

    /// Scheduler is not running
    #[error("Scheduler is not running")]
    NotRunning,
}

impl From<JobSchedulerError> for SchedulerError {
    fn from(err: JobSchedulerError) -> Self {
        SchedulerError::Scheduler(err.to_string())
    }
}
