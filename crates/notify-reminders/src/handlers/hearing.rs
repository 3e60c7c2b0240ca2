//! Hearing reminders: two jobs counting down to the first scheduled hearing.

use chrono::{DateTime, Duration, Utc};
use notify_scheduler::JobScheduler;
use notify_types::{CaseEvent, EventType, ReminderSettings};
use tracing::debug;

use super::{duration_from_secs, ensure_can_handle, schedule_reminder, ReminderHandler};
use crate::error::ReminderError;
use crate::extractor::{DateExtractor, HearingDateExtractor};

/// Schedules one `hearingReminder` job per configured offset before the
/// hearing. Both jobs share the case's hearing reminder group.
pub struct HearingReminder {
    offsets: [Duration; 2],
    extractor: HearingDateExtractor,
    scheduler: JobScheduler,
}

impl HearingReminder {
    /// # Errors
    ///
    /// Returns `ReminderError::Config` if the hearing time zone is unknown.
    pub fn new(settings: &ReminderSettings, scheduler: JobScheduler) -> Result<Self, ReminderError> {
        Ok(Self {
            offsets: [
                duration_from_secs(settings.first_hearing_offset_secs),
                duration_from_secs(settings.second_hearing_offset_secs),
            ],
            extractor: HearingDateExtractor::new(settings.parse_hearing_timezone()?),
            scheduler,
        })
    }

    /// Reminder times for the case, one per offset, if the hearing resolves.
    pub fn reminder_times(&self, event: &CaseEvent) -> Option<Vec<DateTime<Utc>>> {
        let hearing_at = self.extractor.extract(&event.new)?;
        self.offsets
            .iter()
            .map(|offset| hearing_at.checked_sub_signed(*offset))
            .collect()
    }
}

impl ReminderHandler for HearingReminder {
    fn name(&self) -> &'static str {
        "hearingReminder"
    }

    fn trigger(&self) -> EventType {
        EventType::HearingBooked
    }

    fn can_schedule(&self, event: &CaseEvent) -> bool {
        let resolvable = self.reminder_times(event).is_some();
        if !resolvable {
            debug!(case_id = %event.case_id(), "No resolvable hearing for hearing reminders");
        }
        resolvable
    }

    fn handle(&self, event: &CaseEvent) -> Result<Vec<String>, ReminderError> {
        ensure_can_handle(self, event)?;

        let times = self
            .reminder_times(event)
            .ok_or_else(|| ReminderError::AnchorNotResolvable {
                case_id: event.case_id().to_string(),
                reminder: EventType::HearingReminder,
            })?;

        times
            .into_iter()
            .map(|trigger_at| {
                schedule_reminder(
                    &self.scheduler,
                    event.case_id(),
                    EventType::HearingReminder,
                    trigger_at,
                )
            })
            .collect()
    }
}
