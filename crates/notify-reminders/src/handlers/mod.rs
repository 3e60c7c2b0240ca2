//! Reminder handlers: schedule reminder jobs when their trigger event arrives.
//!
//! The reminder service probes each handler in order with `can_handle`.
//! Handlers are stateless, so one instance serves every case concurrently.

mod anchored;
mod hearing;
mod hearing_holding;

pub use anchored::AnchoredReminder;
pub use hearing::HearingReminder;
pub use hearing_holding::HearingHoldingReminder;

use chrono::{DateTime, Duration, Utc};
use notify_scheduler::{Job, JobScheduler};
use notify_types::{CaseEvent, EventType};
use tracing::info;

use crate::error::ReminderError;
use crate::group_key::job_group;
use crate::payload::ReminderPayload;

/// Schedules the reminder jobs of one reminder family.
pub trait ReminderHandler: Send + Sync {
    /// Name used in logs and contract-violation errors.
    fn name(&self) -> &'static str;

    /// The event that makes this handler schedule reminders.
    fn trigger(&self) -> EventType;

    /// Whether `event` is this handler's trigger.
    fn can_handle(&self, event: &CaseEvent) -> bool {
        event.event_type == self.trigger()
    }

    /// Whether the anchor date resolves. Never fails: problems are logged
    /// and reported as `false`.
    fn can_schedule(&self, event: &CaseEvent) -> bool;

    /// Schedule the reminder jobs and return their ids.
    ///
    /// Calling this again for the same case schedules duplicates in the same
    /// group, which cancel together.
    ///
    /// # Errors
    ///
    /// - `ContractViolation` if `can_handle` is false for `event`
    /// - `AnchorNotResolvable` if the anchor date is missing
    /// - `Scheduler` if the job store rejects the jobs
    fn handle(&self, event: &CaseEvent) -> Result<Vec<String>, ReminderError>;
}

pub(crate) fn ensure_can_handle<H: ReminderHandler + ?Sized>(
    handler: &H,
    event: &CaseEvent,
) -> Result<(), ReminderError> {
    if handler.can_handle(event) {
        Ok(())
    } else {
        Err(ReminderError::ContractViolation {
            component: handler.name(),
            event_type: event.event_type,
        })
    }
}

/// Schedule one `reminder` job for the case under its group key.
pub(crate) fn schedule_reminder(
    scheduler: &JobScheduler,
    case_id: &str,
    reminder: EventType,
    trigger_at: DateTime<Utc>,
) -> Result<String, ReminderError> {
    let job = Job::new(
        job_group(case_id, reminder),
        reminder.id(),
        ReminderPayload::new(case_id, reminder),
        trigger_at,
    );
    let id = scheduler.schedule(&job)?;
    info!(case_id = %case_id, reminder = %reminder, trigger_at = %trigger_at, job_id = %id, "Reminder scheduled");
    Ok(id)
}

/// Configured delays are whole seconds.
pub(crate) fn duration_from_secs(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{event, harness};
    use notify_types::ReminderSettings;

    /// Every handler rejects every event other than its trigger.
    #[test]
    fn test_handlers_reject_foreign_events() {
        let h = harness();
        let settings = ReminderSettings::default();
        let handlers: Vec<Box<dyn ReminderHandler>> = vec![
            Box::new(AnchoredReminder::dwp_response_late(&settings, h.scheduler.clone())),
            Box::new(AnchoredReminder::evidence(&settings, h.scheduler.clone())),
            Box::new(HearingHoldingReminder::new(&settings, h.scheduler.clone())),
            Box::new(HearingReminder::new(&settings, h.scheduler.clone()).unwrap()),
        ];

        for handler in &handlers {
            for event_type in EventType::ALL {
                let case_event = event(event_type, "ABC123");
                if event_type == handler.trigger() {
                    assert!(handler.can_handle(&case_event));
                    continue;
                }
                assert!(!handler.can_handle(&case_event), "{} / {}", handler.name(), event_type);
                let result = handler.handle(&case_event);
                assert!(
                    matches!(result, Err(ReminderError::ContractViolation { event_type: e, .. }) if e == event_type),
                    "{} accepted {}",
                    handler.name(),
                    event_type
                );
            }
        }
        assert!(h.all_jobs().is_empty());
    }

    #[test]
    fn test_duration_from_secs() {
        assert_eq!(duration_from_secs(172800), Duration::days(2));
        assert_eq!(duration_from_secs(u64::MAX), Duration::MAX);
    }
}
