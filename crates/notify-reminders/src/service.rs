//! Reminder service: applies every remover and handler to an inbound event.

use notify_scheduler::{JobRemover, JobScheduler};
use notify_types::{CaseEvent, ReminderSettings};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ReminderError;
use crate::handlers::{AnchoredReminder, HearingHoldingReminder, HearingReminder, ReminderHandler};
use crate::removers::{GroupRemover, ReminderRemover};

/// What processing one event did to the reminder jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderOutcome {
    /// Ids of newly scheduled jobs
    pub scheduled: Vec<String>,
    /// Group keys whose jobs were cancelled
    pub removed_groups: Vec<String>,
}

/// Ordered removers and handlers probed for every event.
pub struct ReminderService {
    handlers: Vec<Box<dyn ReminderHandler>>,
    removers: Vec<Box<dyn ReminderRemover>>,
}

impl ReminderService {
    pub fn new(
        handlers: Vec<Box<dyn ReminderHandler>>,
        removers: Vec<Box<dyn ReminderRemover>>,
    ) -> Self {
        Self { handlers, removers }
    }

    /// The standard reminder families.
    ///
    /// # Errors
    ///
    /// Returns `ReminderError::Config` if the hearing time zone is unknown.
    pub fn from_settings(
        settings: &ReminderSettings,
        scheduler: JobScheduler,
        remover: JobRemover,
    ) -> Result<Self, ReminderError> {
        let handlers: Vec<Box<dyn ReminderHandler>> = vec![
            Box::new(AnchoredReminder::dwp_response_late(settings, scheduler.clone())),
            Box::new(AnchoredReminder::evidence(settings, scheduler.clone())),
            Box::new(HearingHoldingReminder::new(settings, scheduler.clone())),
            Box::new(HearingReminder::new(settings, scheduler)?),
        ];
        let removers: Vec<Box<dyn ReminderRemover>> = vec![
            Box::new(GroupRemover::dwp_response_late(remover.clone())),
            Box::new(GroupRemover::hearing_holding(remover.clone())),
            Box::new(GroupRemover::hearing(remover.clone())),
            Box::new(GroupRemover::evidence(remover)),
        ];
        Ok(Self::new(handlers, removers))
    }

    /// Cancel obsolete reminders, then schedule new ones.
    ///
    /// Removal runs first so an event that both cancels and schedules the
    /// same family leaves only the new jobs. Unresolvable anchors are logged
    /// and dropped.
    ///
    /// # Errors
    ///
    /// Returns the first store fault; work already done is not rolled back.
    pub fn process(&self, event: &CaseEvent) -> Result<ReminderOutcome, ReminderError> {
        let mut outcome = ReminderOutcome::default();

        for remover in self.removers.iter().filter(|r| r.can_handle(event)) {
            outcome.removed_groups.extend(remover.handle(event)?);
        }

        for handler in self.handlers.iter().filter(|h| h.can_handle(event)) {
            if !handler.can_schedule(event) {
                debug!(case_id = %event.case_id(), handler = handler.name(), "Reminder not yet schedulable");
                continue;
            }
            match handler.handle(event) {
                Ok(ids) => outcome.scheduled.extend(ids),
                Err(e @ ReminderError::AnchorNotResolvable { .. }) => {
                    warn!(case_id = %event.case_id(), handler = handler.name(), error = %e, "Reminder dropped");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(outcome)
    }
}
