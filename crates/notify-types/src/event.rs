//! Case event types and event history records.
//!
//! Event types form a closed enumeration. Their wire names are the
//! camelCase identifiers used in case payloads, job names and job group keys.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

/// Type of a case event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    /// Appeal received by the tribunal
    AppealReceived,
    /// DWP response to the appeal received
    DwpResponseReceived,
    /// Further evidence received
    EvidenceReceived,
    /// Hearing booked
    HearingBooked,
    /// Hearing postponed
    Postponement,
    /// Hearing adjourned
    Adjournment,
    /// Appeal made dormant
    AppealDormant,
    /// Appeal lapsed
    AppealLapsed,
    /// Appeal withdrawn
    AppealWithdrawn,
    /// A party changed their subscription details
    SubscriptionUpdated,
    /// DWP has not responded in time
    DwpResponseLateReminder,
    /// Reminder to send evidence
    EvidenceReminder,
    /// Reminder of an upcoming hearing
    HearingReminder,
    /// First "no hearing booked yet" reminder
    FirstHearingHoldingReminder,
    /// Second "no hearing booked yet" reminder
    SecondHearingHoldingReminder,
    /// Third "no hearing booked yet" reminder
    ThirdHearingHoldingReminder,
    /// Final "no hearing booked yet" reminder
    FinalHearingHoldingReminder,
}

impl EventType {
    /// Every event type, in declaration order.
    pub const ALL: [EventType; 17] = [
        EventType::AppealReceived,
        EventType::DwpResponseReceived,
        EventType::EvidenceReceived,
        EventType::HearingBooked,
        EventType::Postponement,
        EventType::Adjournment,
        EventType::AppealDormant,
        EventType::AppealLapsed,
        EventType::AppealWithdrawn,
        EventType::SubscriptionUpdated,
        EventType::DwpResponseLateReminder,
        EventType::EvidenceReminder,
        EventType::HearingReminder,
        EventType::FirstHearingHoldingReminder,
        EventType::SecondHearingHoldingReminder,
        EventType::ThirdHearingHoldingReminder,
        EventType::FinalHearingHoldingReminder,
    ];

    /// The hearing holding reminder stages, in firing order.
    pub const HOLDING_REMINDERS: [EventType; 4] = [
        EventType::FirstHearingHoldingReminder,
        EventType::SecondHearingHoldingReminder,
        EventType::ThirdHearingHoldingReminder,
        EventType::FinalHearingHoldingReminder,
    ];

    /// Wire identifier of the event (e.g. `hearingReminder`).
    pub fn id(&self) -> &'static str {
        match self {
            EventType::AppealReceived => "appealReceived",
            EventType::DwpResponseReceived => "dwpResponseReceived",
            EventType::EvidenceReceived => "evidenceReceived",
            EventType::HearingBooked => "hearingBooked",
            EventType::Postponement => "postponement",
            EventType::Adjournment => "adjournment",
            EventType::AppealDormant => "appealDormant",
            EventType::AppealLapsed => "appealLapsed",
            EventType::AppealWithdrawn => "appealWithdrawn",
            EventType::SubscriptionUpdated => "subscriptionUpdated",
            EventType::DwpResponseLateReminder => "dwpResponseLateReminder",
            EventType::EvidenceReminder => "evidenceReminder",
            EventType::HearingReminder => "hearingReminder",
            EventType::FirstHearingHoldingReminder => "firstHearingHoldingReminder",
            EventType::SecondHearingHoldingReminder => "secondHearingHoldingReminder",
            EventType::ThirdHearingHoldingReminder => "thirdHearingHoldingReminder",
            EventType::FinalHearingHoldingReminder => "finalHearingHoldingReminder",
        }
    }

    /// Whether the event is produced by a scheduled reminder job.
    pub fn is_reminder(&self) -> bool {
        matches!(
            self,
            EventType::DwpResponseLateReminder
                | EventType::EvidenceReminder
                | EventType::HearingReminder
                | EventType::FirstHearingHoldingReminder
                | EventType::SecondHearingHoldingReminder
                | EventType::ThirdHearingHoldingReminder
                | EventType::FinalHearingHoldingReminder
        )
    }

    /// Whether the event's notification can be resent to a party that
    /// has just subscribed.
    ///
    /// Reminders and subscription changes are not substantive case progress.
    pub fn is_substantive(&self) -> bool {
        !self.is_reminder() && *self != EventType::SubscriptionUpdated
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for EventType {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .find(|event_type| event_type.id() == s)
            .copied()
            .ok_or_else(|| NotifyError::UnknownEventType(s.to_string()))
    }
}

/// An entry in a case's event history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Type of event
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// When the event happened
    pub date: DateTime<Utc>,
}

impl EventRecord {
    /// Create a new event record
    pub fn new(event_type: EventType, date: DateTime<Utc>) -> Self {
        Self { event_type, date }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_wire_names() {
        let json = serde_json::to_string(&EventType::DwpResponseLateReminder).unwrap();
        assert_eq!(json, "\"dwpResponseLateReminder\"");

        let parsed: EventType = serde_json::from_str("\"hearingBooked\"").unwrap();
        assert_eq!(parsed, EventType::HearingBooked);
    }

    #[test]
    fn test_id_matches_serde_name_for_all() {
        for event_type in EventType::ALL {
            let json = serde_json::to_string(&event_type).unwrap();
            assert_eq!(json, format!("\"{}\"", event_type.id()));
            assert_eq!(event_type.id().parse::<EventType>().unwrap(), event_type);
        }
    }

    #[test]
    fn test_parse_unknown_event_type() {
        let result = "hearingCancelled".parse::<EventType>();
        assert!(matches!(result, Err(NotifyError::UnknownEventType(_))));
    }

    #[test]
    fn test_substantive_events() {
        assert!(EventType::HearingBooked.is_substantive());
        assert!(EventType::AppealReceived.is_substantive());
        assert!(!EventType::SubscriptionUpdated.is_substantive());
        assert!(!EventType::EvidenceReminder.is_substantive());
        assert!(EventType::HOLDING_REMINDERS.iter().all(|e| e.is_reminder()));
    }

    #[test]
    fn test_event_record_serialization() {
        let record = EventRecord::new(
            EventType::AppealReceived,
            "2018-01-01T10:00:00Z".parse().unwrap(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "appealReceived");
        assert_eq!(json["date"], "2018-01-01T10:00:00Z");
    }
}
