//! Hearing holding reminders: a four-stage chain sent while no hearing is booked.
//!
//! Stage 1 is anchored on the DWP response date. Each later stage is
//! anchored on the previous stage's resolved trigger time, not on a
//! multiple of one delay, so stages can be configured independently.

use chrono::{DateTime, Duration, Utc};
use notify_scheduler::JobScheduler;
use notify_types::{CaseEvent, EventType, ReminderSettings};
use tracing::{debug, warn};

use super::{duration_from_secs, ensure_can_handle, schedule_reminder, ReminderHandler};
use crate::error::ReminderError;
use crate::extractor::{DateExtractor, EventDateExtractor};

pub struct HearingHoldingReminder {
    delays: [Duration; 4],
    extractor: EventDateExtractor,
    scheduler: JobScheduler,
}

impl HearingHoldingReminder {
    pub fn new(settings: &ReminderSettings, scheduler: JobScheduler) -> Self {
        Self {
            delays: settings.holding_delays_secs().map(duration_from_secs),
            extractor: EventDateExtractor::new(EventType::DwpResponseReceived),
            scheduler,
        }
    }

    /// Trigger time of each stage, in chain order. A stage whose anchor
    /// does not resolve is `None`.
    pub fn stage_times(&self, event: &CaseEvent) -> [Option<DateTime<Utc>>; 4] {
        let mut times = [None; 4];
        let mut anchor = self.extractor.extract(&event.new);
        for (slot, delay) in times.iter_mut().zip(self.delays) {
            *slot = anchor.and_then(|a| a.checked_add_signed(delay));
            anchor = *slot;
        }
        times
    }
}

impl ReminderHandler for HearingHoldingReminder {
    fn name(&self) -> &'static str {
        "hearingHoldingReminder"
    }

    fn trigger(&self) -> EventType {
        EventType::DwpResponseReceived
    }

    fn can_schedule(&self, event: &CaseEvent) -> bool {
        let resolvable = self.stage_times(event)[0].is_some();
        if !resolvable {
            debug!(case_id = %event.case_id(), "No DWP response date for holding reminders");
        }
        resolvable
    }

    fn handle(&self, event: &CaseEvent) -> Result<Vec<String>, ReminderError> {
        ensure_can_handle(self, event)?;

        let case_id = event.case_id();
        let mut ids = Vec::new();
        for (reminder, trigger_at) in EventType::HOLDING_REMINDERS
            .into_iter()
            .zip(self.stage_times(event))
        {
            match trigger_at {
                Some(trigger_at) => {
                    ids.push(schedule_reminder(&self.scheduler, case_id, reminder, trigger_at)?)
                }
                None => warn!(case_id = %case_id, reminder = %reminder, "Holding reminder stage skipped, anchor unresolved"),
            }
        }

        if ids.is_empty() {
            return Err(ReminderError::AnchorNotResolvable {
                case_id: case_id.to_string(),
                reminder: EventType::FirstHearingHoldingReminder,
            });
        }
        Ok(ids)
    }
}
