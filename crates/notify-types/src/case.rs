//! Case snapshot model.
//!
//! A snapshot is a point-in-time view of a case: its subscriptions,
//! scheduled hearings and append-only event history. The engine receives
//! two snapshots per inbound event (old and new) and never mutates either.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{EventRecord, EventType};

/// Delivery channel of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Email to the subscribed address
    Email,
    /// SMS to the subscribed mobile number
    Sms,
}

impl Channel {
    /// All channels, in routing order.
    pub const ALL: [Channel; 2] = [Channel::Email, Channel::Sms];
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Email => write!(f, "email"),
            Channel::Sms => write!(f, "sms"),
        }
    }
}

/// Notification preferences and contact details of one party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Whether the party wants email notifications
    #[serde(default)]
    pub email_subscribed: bool,

    /// Whether the party wants SMS notifications
    #[serde(default)]
    pub sms_subscribed: bool,

    /// Email address
    #[serde(default)]
    pub email: Option<String>,

    /// Mobile number
    #[serde(default)]
    pub mobile: Option<String>,

    /// Stable token identifying the party across snapshots
    #[serde(default)]
    pub token: String,
}

impl Subscription {
    /// Whether the party is subscribed on `channel`.
    pub fn is_subscribed(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email_subscribed,
            Channel::Sms => self.sms_subscribed,
        }
    }

    /// Address on `channel`, if one is recorded and non-blank.
    pub fn address(&self, channel: Channel) -> Option<&str> {
        let address = match channel {
            Channel::Email => self.email.as_deref(),
            Channel::Sms => self.mobile.as_deref(),
        };
        address.map(str::trim).filter(|a| !a.is_empty())
    }

    /// Address to deliver to on `channel`: subscribed and addressable.
    pub fn destination(&self, channel: Channel) -> Option<&str> {
        if self.is_subscribed(channel) {
            self.address(channel)
        } else {
            None
        }
    }
}

/// A party to the case other than the appellant's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherParty {
    /// Identifier of the party within the case
    pub id: String,

    /// The party's subscription
    pub subscription: Subscription,
}

/// An interested party of a case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Party {
    /// The person appealing
    Appellant,
    /// Someone appointed to act for the appellant
    Appointee,
    /// The appellant's representative
    Representative,
    /// A joint party to the appeal
    JointParty,
    /// Another party, by id
    OtherParty(String),
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Appellant => write!(f, "appellant"),
            Party::Appointee => write!(f, "appointee"),
            Party::Representative => write!(f, "representative"),
            Party::JointParty => write!(f, "joint_party"),
            Party::OtherParty(id) => write!(f, "other_party:{}", id),
        }
    }
}

/// Subscriptions of every party present on a case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriptions {
    /// Appellant subscription
    #[serde(default)]
    pub appellant: Option<Subscription>,

    /// Appointee subscription
    #[serde(default)]
    pub appointee: Option<Subscription>,

    /// Representative subscription
    #[serde(default)]
    pub representative: Option<Subscription>,

    /// Joint party subscription
    #[serde(default)]
    pub joint_party: Option<Subscription>,

    /// Other parties
    #[serde(default)]
    pub other_parties: Vec<OtherParty>,
}

impl Subscriptions {
    /// Subscription of `party`, if the party is present.
    pub fn get(&self, party: &Party) -> Option<&Subscription> {
        match party {
            Party::Appellant => self.appellant.as_ref(),
            Party::Appointee => self.appointee.as_ref(),
            Party::Representative => self.representative.as_ref(),
            Party::JointParty => self.joint_party.as_ref(),
            Party::OtherParty(id) => self
                .other_parties
                .iter()
                .find(|p| &p.id == id)
                .map(|p| &p.subscription),
        }
    }

    /// Every party present, in a fixed order.
    pub fn parties(&self) -> Vec<Party> {
        let mut parties = Vec::new();
        if self.appellant.is_some() {
            parties.push(Party::Appellant);
        }
        if self.appointee.is_some() {
            parties.push(Party::Appointee);
        }
        if self.representative.is_some() {
            parties.push(Party::Representative);
        }
        if self.joint_party.is_some() {
            parties.push(Party::JointParty);
        }
        parties.extend(
            self.other_parties
                .iter()
                .map(|p| Party::OtherParty(p.id.clone())),
        );
        parties
    }
}

/// A scheduled hearing. Date and time are local to the tribunal's time zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hearing {
    /// Hearing date (local)
    pub date: NaiveDate,

    /// Hearing start time (local)
    pub time: NaiveTime,

    /// Venue name
    #[serde(default)]
    pub venue: String,
}

/// Point-in-time view of a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSnapshot {
    /// Stable case identifier
    pub case_id: String,

    /// Event history, not assumed to be sorted
    #[serde(default)]
    pub events: Vec<EventRecord>,

    /// Subscriptions of the parties present
    #[serde(default)]
    pub subscriptions: Subscriptions,

    /// Scheduled hearings, first entry is the current one
    #[serde(default)]
    pub hearings: Vec<Hearing>,
}

impl CaseSnapshot {
    /// Create an empty snapshot for a case
    pub fn new(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            events: Vec::new(),
            subscriptions: Subscriptions::default(),
            hearings: Vec::new(),
        }
    }

    /// Append an event to the history
    pub fn with_event(mut self, event_type: EventType, date: DateTime<Utc>) -> Self {
        self.events.push(EventRecord::new(event_type, date));
        self
    }

    /// Add a hearing
    pub fn with_hearing(mut self, hearing: Hearing) -> Self {
        self.hearings.push(hearing);
        self
    }

    /// Set the subscriptions
    pub fn with_subscriptions(mut self, subscriptions: Subscriptions) -> Self {
        self.subscriptions = subscriptions;
        self
    }

    /// Event history, most recent first.
    ///
    /// Ties on timestamp resolve by history position: the later-appended
    /// entry is considered more recent.
    pub fn events_descending(&self) -> Vec<&EventRecord> {
        let mut indexed: Vec<(usize, &EventRecord)> = self.events.iter().enumerate().collect();
        indexed.sort_by(|(ia, a), (ib, b)| b.date.cmp(&a.date).then(ib.cmp(ia)));
        indexed.into_iter().map(|(_, record)| record).collect()
    }

    /// Timestamp of the most recent event of `event_type`.
    pub fn latest_event_date(&self, event_type: EventType) -> Option<DateTime<Utc>> {
        self.events
            .iter()
            .enumerate()
            .filter(|(_, record)| record.event_type == event_type)
            .max_by_key(|(index, record)| (record.date, *index))
            .map(|(_, record)| record.date)
    }

    /// The current hearing, if one is scheduled.
    pub fn first_hearing(&self) -> Option<&Hearing> {
        self.hearings.first()
    }
}

/// An inbound case-state change: the trigger and the two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseEvent {
    /// The event that triggered this change
    pub event_type: EventType,

    /// Snapshot before the change; absent for creation events
    #[serde(default)]
    pub old: Option<CaseSnapshot>,

    /// Snapshot after the change
    pub new: CaseSnapshot,
}

impl CaseEvent {
    /// Create a case event
    pub fn new(event_type: EventType, old: Option<CaseSnapshot>, new: CaseSnapshot) -> Self {
        Self {
            event_type,
            old,
            new,
        }
    }

    /// Case id, taken from the new snapshot
    pub fn case_id(&self) -> &str {
        &self.new.case_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn subscribed(email: &str, mobile: &str) -> Subscription {
        Subscription {
            email_subscribed: true,
            sms_subscribed: true,
            email: Some(email.to_string()),
            mobile: Some(mobile.to_string()),
            token: "tok".to_string(),
        }
    }

    #[test]
    fn test_latest_event_date_unsorted_history() {
        let snapshot = CaseSnapshot::new("ABC123")
            .with_event(EventType::AppealReceived, ts("2018-01-05T10:00:00Z"))
            .with_event(EventType::AppealReceived, ts("2018-01-09T10:00:00Z"))
            .with_event(EventType::DwpResponseReceived, ts("2018-01-12T10:00:00Z"))
            .with_event(EventType::AppealReceived, ts("2018-01-02T10:00:00Z"));

        assert_eq!(
            snapshot.latest_event_date(EventType::AppealReceived),
            Some(ts("2018-01-09T10:00:00Z"))
        );
        assert_eq!(snapshot.latest_event_date(EventType::HearingBooked), None);
    }

    #[test]
    fn test_events_descending_breaks_ties_by_position() {
        let same = ts("2018-01-05T10:00:00Z");
        let snapshot = CaseSnapshot::new("ABC123")
            .with_event(EventType::AppealReceived, same)
            .with_event(EventType::EvidenceReceived, same)
            .with_event(EventType::AppealLapsed, ts("2018-01-01T10:00:00Z"));

        let ordered: Vec<EventType> = snapshot
            .events_descending()
            .iter()
            .map(|r| r.event_type)
            .collect();
        assert_eq!(
            ordered,
            vec![
                EventType::EvidenceReceived,
                EventType::AppealReceived,
                EventType::AppealLapsed
            ]
        );
    }

    #[test]
    fn test_subscription_destination() {
        let mut sub = subscribed("a@example.com", "07700900000");
        assert_eq!(sub.destination(Channel::Email), Some("a@example.com"));
        assert_eq!(sub.destination(Channel::Sms), Some("07700900000"));

        sub.sms_subscribed = false;
        assert_eq!(sub.destination(Channel::Sms), None);

        sub.email = Some("   ".to_string());
        assert_eq!(sub.destination(Channel::Email), None);
    }

    #[test]
    fn test_parties_in_fixed_order() {
        let subs = Subscriptions {
            appellant: Some(Subscription::default()),
            representative: Some(Subscription::default()),
            other_parties: vec![OtherParty {
                id: "op1".to_string(),
                subscription: Subscription::default(),
            }],
            ..Default::default()
        };

        assert_eq!(
            subs.parties(),
            vec![
                Party::Appellant,
                Party::Representative,
                Party::OtherParty("op1".to_string())
            ]
        );
        assert!(subs.get(&Party::Appointee).is_none());
        assert!(subs.get(&Party::OtherParty("op1".to_string())).is_some());
    }

    #[test]
    fn test_case_event_from_json() {
        let json = r#"{
            "eventType": "hearingBooked",
            "new": {
                "caseId": "ABC123",
                "events": [{"type": "hearingBooked", "date": "2017-12-01T09:00:00Z"}],
                "subscriptions": {
                    "appellant": {"emailSubscribed": true, "email": "a@example.com", "token": "t1"}
                },
                "hearings": [{"date": "2018-01-01", "time": "14:01:18", "venue": "Fox Court"}]
            }
        }"#;

        let event: CaseEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.case_id(), "ABC123");
        assert_eq!(event.event_type, EventType::HearingBooked);
        assert!(event.old.is_none());
        assert_eq!(event.new.first_hearing().unwrap().venue, "Fox Court");
        assert_eq!(
            event
                .new
                .subscriptions
                .appellant
                .as_ref()
                .unwrap()
                .destination(Channel::Email),
            Some("a@example.com")
        );
    }
}
