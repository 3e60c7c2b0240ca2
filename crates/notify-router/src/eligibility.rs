//! Which parties may receive each event's notification.
//!
//! A fixed lookup table, built once on first use.

use std::collections::HashMap;
use std::sync::OnceLock;

use notify_types::{EventType, Party, Subscriptions};

/// A class of party in the eligibility table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Appellant,
    Appointee,
    Representative,
    JointParty,
    OtherParties,
}

const APPELLANT_SIDE: &[Audience] = &[
    Audience::Appellant,
    Audience::Appointee,
    Audience::Representative,
    Audience::JointParty,
];

const ALL_PARTIES: &[Audience] = &[
    Audience::Appellant,
    Audience::Appointee,
    Audience::Representative,
    Audience::JointParty,
    Audience::OtherParties,
];

static TABLE: OnceLock<HashMap<EventType, &'static [Audience]>> = OnceLock::new();

fn table() -> &'static HashMap<EventType, &'static [Audience]> {
    TABLE.get_or_init(|| {
        EventType::ALL
            .into_iter()
            .map(|event_type| {
                let audience = match event_type {
                    EventType::HearingBooked
                    | EventType::Postponement
                    | EventType::Adjournment
                    | EventType::HearingReminder => ALL_PARTIES,
                    _ => APPELLANT_SIDE,
                };
                (event_type, audience)
            })
            .collect()
    })
}

/// The audiences eligible for `event_type`'s notification.
pub fn audiences(event_type: EventType) -> &'static [Audience] {
    table().get(&event_type).copied().unwrap_or(&[])
}

impl Audience {
    fn includes(&self, party: &Party) -> bool {
        matches!(
            (self, party),
            (Audience::Appellant, Party::Appellant)
                | (Audience::Appointee, Party::Appointee)
                | (Audience::Representative, Party::Representative)
                | (Audience::JointParty, Party::JointParty)
                | (Audience::OtherParties, Party::OtherParty(_))
        )
    }
}

/// Parties present in `subscriptions` that are eligible for `event_type`,
/// in the subscriptions' fixed party order.
///
/// An appointee acts for the appellant, so the appellant is left out
/// whenever an appointee is present.
pub fn eligible_parties(event_type: EventType, subscriptions: &Subscriptions) -> Vec<Party> {
    let audiences = audiences(event_type);
    let has_appointee = subscriptions.appointee.is_some();
    subscriptions
        .parties()
        .into_iter()
        .filter(|party| !(has_appointee && *party == Party::Appellant))
        .filter(|party| audiences.iter().any(|audience| audience.includes(party)))
        .collect()
}
