//! Reminders anchored on a single prior event plus a fixed delay.

use chrono::{DateTime, Duration, Utc};
use notify_scheduler::JobScheduler;
use notify_types::{CaseEvent, EventType, ReminderSettings};
use tracing::debug;

use super::{duration_from_secs, ensure_can_handle, schedule_reminder, ReminderHandler};
use crate::error::ReminderError;
use crate::extractor::{DateExtractor, EventDateExtractor};

/// Schedules `reminder` at the trigger event's most recent date plus `delay`.
pub struct AnchoredReminder {
    name: &'static str,
    trigger: EventType,
    reminder: EventType,
    delay: Duration,
    extractor: EventDateExtractor,
    scheduler: JobScheduler,
}

impl AnchoredReminder {
    /// Reminder anchored on `trigger`'s own date.
    pub fn new(
        trigger: EventType,
        reminder: EventType,
        delay: Duration,
        scheduler: JobScheduler,
    ) -> Self {
        Self {
            name: reminder.id(),
            trigger,
            reminder,
            delay,
            extractor: EventDateExtractor::new(trigger),
            scheduler,
        }
    }

    /// DWP has not responded: fires `D1` after the appeal was received.
    pub fn dwp_response_late(settings: &ReminderSettings, scheduler: JobScheduler) -> Self {
        Self::new(
            EventType::AppealReceived,
            EventType::DwpResponseLateReminder,
            duration_from_secs(settings.dwp_response_late_delay_secs),
            scheduler,
        )
    }

    /// Evidence reminder: fires `D2` after the DWP response arrived.
    pub fn evidence(settings: &ReminderSettings, scheduler: JobScheduler) -> Self {
        Self::new(
            EventType::DwpResponseReceived,
            EventType::EvidenceReminder,
            duration_from_secs(settings.evidence_delay_secs),
            scheduler,
        )
    }

    /// Trigger time for the case, if the anchor resolves.
    pub fn trigger_time(&self, event: &CaseEvent) -> Option<DateTime<Utc>> {
        let anchor = self.extractor.extract(&event.new)?;
        anchor.checked_add_signed(self.delay)
    }
}

impl ReminderHandler for AnchoredReminder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn trigger(&self) -> EventType {
        self.trigger
    }

    fn can_schedule(&self, event: &CaseEvent) -> bool {
        let resolvable = self.trigger_time(event).is_some();
        if !resolvable {
            debug!(case_id = %event.case_id(), reminder = %self.reminder, "No anchor date yet");
        }
        resolvable
    }

    fn handle(&self, event: &CaseEvent) -> Result<Vec<String>, ReminderError> {
        ensure_can_handle(self, event)?;

        let trigger_at =
            self.trigger_time(event)
                .ok_or_else(|| ReminderError::AnchorNotResolvable {
                    case_id: event.case_id().to_string(),
                    reminder: self.reminder,
                })?;

        let id = schedule_reminder(&self.scheduler, event.case_id(), self.reminder, trigger_at)?;
        Ok(vec![id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, harness};
    use notify_types::CaseSnapshot;

    #[test]
    fn test_late_response_scheduled_d1_after_appeal_received() {
        let h = harness();
        let settings = ReminderSettings::default();
        let handler = AnchoredReminder::dwp_response_late(&settings, h.scheduler.clone());

        let received = at("2018-01-01T10:00:00Z");
        let event = CaseEvent::new(
            EventType::AppealReceived,
            None,
            CaseSnapshot::new("ABC123").with_event(EventType::AppealReceived, received),
        );

        assert!(handler.can_handle(&event));
        assert!(handler.can_schedule(&event));
        let ids = handler.handle(&event).unwrap();
        assert_eq!(ids.len(), 1);

        let jobs = h.group("ABC123_dwpResponseLateReminder");
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, ids[0]);
        assert_eq!(jobs[0].name, "dwpResponseLateReminder");
        assert_eq!(
            jobs[0].trigger_at,
            received + Duration::seconds(settings.dwp_response_late_delay_secs as i64)
        );
        assert_eq!(h.all_jobs().len(), 1);
    }

    #[test]
    fn test_evidence_reminder_uses_latest_dwp_response() {
        let h = harness();
        let settings = ReminderSettings {
            evidence_delay_secs: 3600,
            ..Default::default()
        };
        let handler = AnchoredReminder::evidence(&settings, h.scheduler.clone());

        let snapshot = CaseSnapshot::new("ABC123")
            .with_event(EventType::DwpResponseReceived, at("2018-02-03T09:00:00Z"))
            .with_event(EventType::DwpResponseReceived, at("2018-02-01T09:00:00Z"));
        let event = CaseEvent::new(EventType::DwpResponseReceived, None, snapshot);

        handler.handle(&event).unwrap();

        let jobs = h.group("ABC123_evidenceReminder");
        assert_eq!(jobs[0].trigger_at, at("2018-02-03T10:00:00Z"));
    }

    #[test]
    fn test_no_anchor_schedules_nothing() {
        let h = harness();
        let handler =
            AnchoredReminder::dwp_response_late(&ReminderSettings::default(), h.scheduler.clone());
        let event = CaseEvent::new(EventType::AppealReceived, None, CaseSnapshot::new("ABC123"));

        assert!(handler.can_handle(&event));
        assert!(!handler.can_schedule(&event));
        assert!(matches!(
            handler.handle(&event),
            Err(ReminderError::AnchorNotResolvable { .. })
        ));
        assert!(h.all_jobs().is_empty());
    }

    #[test]
    fn test_handle_twice_duplicates_within_group() {
        let h = harness();
        let handler =
            AnchoredReminder::evidence(&ReminderSettings::default(), h.scheduler.clone());
        let event = CaseEvent::new(
            EventType::DwpResponseReceived,
            None,
            CaseSnapshot::new("ABC123")
                .with_event(EventType::DwpResponseReceived, at("2018-02-01T09:00:00Z")),
        );

        handler.handle(&event).unwrap();
        handler.handle(&event).unwrap();
        assert_eq!(h.group("ABC123_evidenceReminder").len(), 2);
    }
}
