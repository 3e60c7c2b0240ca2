//! Reminder removers: cancel reminder groups made obsolete by a new event.
//!
//! A missing group is the normal case (the reminder already fired, or was
//! never scheduled), so it is logged and skipped rather than reported.

use notify_scheduler::{JobRemover, SchedulerError};
use notify_types::{CaseEvent, EventType};
use tracing::{info, warn};

use crate::error::ReminderError;
use crate::group_key::job_group;

/// Cancels the reminder groups of one reminder family.
pub trait ReminderRemover: Send + Sync {
    /// Name used in logs and contract-violation errors.
    fn name(&self) -> &'static str;

    /// Whether `event` cancels this family's reminders.
    fn can_handle(&self, event: &CaseEvent) -> bool;

    /// Remove the family's groups for the case and return the groups that
    /// held jobs.
    ///
    /// # Errors
    ///
    /// - `ContractViolation` if `can_handle` is false for `event`
    /// - `Scheduler` on a store fault
    fn handle(&self, event: &CaseEvent) -> Result<Vec<String>, ReminderError>;
}

/// Removes fixed reminder groups when one of a fixed set of events arrives.
pub struct GroupRemover {
    name: &'static str,
    cancelled_by: &'static [EventType],
    reminders: &'static [EventType],
    remover: JobRemover,
}

impl GroupRemover {
    pub fn new(
        name: &'static str,
        cancelled_by: &'static [EventType],
        reminders: &'static [EventType],
        remover: JobRemover,
    ) -> Self {
        Self {
            name,
            cancelled_by,
            reminders,
            remover,
        }
    }

    pub fn dwp_response_late(remover: JobRemover) -> Self {
        Self::new(
            "dwpResponseLateReminderRemover",
            &[
                EventType::AppealDormant,
                EventType::AppealLapsed,
                EventType::AppealWithdrawn,
                EventType::DwpResponseReceived,
            ],
            &[EventType::DwpResponseLateReminder],
            remover,
        )
    }

    pub fn hearing_holding(remover: JobRemover) -> Self {
        Self::new(
            "hearingHoldingReminderRemover",
            &[
                EventType::HearingBooked,
                EventType::AppealDormant,
                EventType::AppealLapsed,
                EventType::AppealWithdrawn,
            ],
            &EventType::HOLDING_REMINDERS,
            remover,
        )
    }

    pub fn hearing(remover: JobRemover) -> Self {
        Self::new(
            "hearingReminderRemover",
            &[
                // a rebooking replaces the reminders for the earlier date
                EventType::HearingBooked,
                EventType::Postponement,
                EventType::Adjournment,
                EventType::AppealLapsed,
                EventType::AppealWithdrawn,
            ],
            &[EventType::HearingReminder],
            remover,
        )
    }

    pub fn evidence(remover: JobRemover) -> Self {
        Self::new(
            "evidenceReminderRemover",
            &[
                EventType::HearingBooked,
                EventType::AppealDormant,
                EventType::AppealLapsed,
                EventType::AppealWithdrawn,
            ],
            &[EventType::EvidenceReminder],
            remover,
        )
    }

    /// Group keys this remover cancels for `case_id`.
    pub fn groups(&self, case_id: &str) -> Vec<String> {
        self.reminders
            .iter()
            .map(|reminder| job_group(case_id, *reminder))
            .collect()
    }
}

impl ReminderRemover for GroupRemover {
    fn name(&self) -> &'static str {
        self.name
    }

    fn can_handle(&self, event: &CaseEvent) -> bool {
        self.cancelled_by.contains(&event.event_type)
    }

    fn handle(&self, event: &CaseEvent) -> Result<Vec<String>, ReminderError> {
        if !self.can_handle(event) {
            return Err(ReminderError::ContractViolation {
                component: self.name,
                event_type: event.event_type,
            });
        }

        let mut removed = Vec::new();
        for group in self.groups(event.case_id()) {
            match self.remover.remove_group(&group) {
                Ok(ids) => {
                    info!(group = %group, count = ids.len(), trigger = %event.event_type, "Reminders cancelled");
                    removed.push(group);
                }
                Err(SchedulerError::GroupNotFound(_)) => {
                    warn!(group = %group, trigger = %event.event_type, "No reminders to cancel");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }
}
