//! Reminder error types.

use notify_scheduler::SchedulerError;
use notify_types::{EventType, NotifyError};
use thiserror::Error;

/// Errors raised by reminder handlers and removers.
#[derive(Debug, Error)]
pub enum ReminderError {
    /// `handle` was called for an event the component does not handle.
    /// This is a programming error and must never be retried.
    #[error("{component} cannot handle {event_type} events")]
    ContractViolation {
        component: &'static str,
        event_type: EventType,
    },

    /// The date a reminder is anchored to is not in the case yet
    #[error("Cannot resolve anchor date for {reminder} on case {case_id}")]
    AnchorNotResolvable { case_id: String, reminder: EventType },

    /// Scheduling or removal failed in the job store
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// Reminder settings are unusable
    #[error(transparent)]
    Config(#[from] NotifyError),
}
