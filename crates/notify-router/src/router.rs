//! The notification router.

use notify_types::{CaseEvent, CaseSnapshot, Channel, EventType, Party, Subscription};
use tracing::debug;

use crate::decision::{NotificationDecision, NotificationType};
use crate::diff::{diff_subscription, ChannelChange};
use crate::eligibility::eligible_parties;

/// Computes the notifications to send immediately for a case event.
///
/// Routing is a pure function of the event: the router holds no state and
/// performs no I/O. Decisions come out in party order, then channel order.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationRouter;

impl NotificationRouter {
    pub fn new() -> Self {
        Self
    }

    /// Route one case event.
    pub fn route(&self, event: &CaseEvent) -> Vec<NotificationDecision> {
        let decisions = match event.event_type {
            EventType::SubscriptionUpdated => self.route_subscription_update(event),
            event_type => self.route_event(event_type, &event.new),
        };
        debug!(
            case_id = %event.case_id(),
            event = %event.event_type,
            count = decisions.len(),
            "Routed notifications"
        );
        decisions
    }

    fn route_event(&self, event_type: EventType, snapshot: &CaseSnapshot) -> Vec<NotificationDecision> {
        let mut decisions = Vec::new();
        for party in eligible_parties(event_type, &snapshot.subscriptions) {
            let Some(subscription) = snapshot.subscriptions.get(&party) else {
                continue;
            };
            for channel in Channel::ALL {
                if let Some(destination) = subscription.destination(channel) {
                    decisions.push(NotificationDecision::new(
                        party.clone(),
                        channel,
                        NotificationType::Event(event_type),
                        destination,
                    ));
                }
            }
        }
        decisions
    }

    fn route_subscription_update(&self, event: &CaseEvent) -> Vec<NotificationDecision> {
        let resend = latest_substantive_event(&event.new);
        let mut decisions = Vec::new();

        for party in eligible_parties(EventType::SubscriptionUpdated, &event.new.subscriptions) {
            let Some(new) = event.new.subscriptions.get(&party) else {
                continue;
            };
            let old = event
                .old
                .as_ref()
                .and_then(|snapshot| snapshot.subscriptions.get(&party));
            decisions.extend(party_update(&party, old, new, resend));
        }
        decisions
    }
}

fn party_update(
    party: &Party,
    old: Option<&Subscription>,
    new: &Subscription,
    resend: Option<EventType>,
) -> Vec<NotificationDecision> {
    let decision = |channel, notification, destination: &str| {
        NotificationDecision::new(party.clone(), channel, notification, destination)
    };

    let mut decisions = Vec::new();
    for (channel, change) in diff_subscription(old, new) {
        match change {
            ChannelChange::Subscribed { address } => {
                decisions.push(decision(channel, NotificationType::SubscriptionCreated, &address));
                if let Some(event_type) = resend {
                    decisions.push(decision(channel, NotificationType::Event(event_type), &address));
                }
            }
            ChannelChange::AddressChanged { old, new } => {
                if channel == Channel::Email {
                    decisions.push(decision(channel, NotificationType::SubscriptionOld, &old));
                }
                decisions.push(decision(channel, NotificationType::SubscriptionUpdated, &new));
            }
            ChannelChange::Unchanged | ChannelChange::Unsubscribed | ChannelChange::Inactive => {}
        }
    }
    decisions
}

/// Most recent event whose notification is worth resending to a party that
/// just subscribed.
fn latest_substantive_event(snapshot: &CaseSnapshot) -> Option<EventType> {
    snapshot
        .events_descending()
        .into_iter()
        .map(|record| record.event_type)
        .find(EventType::is_substantive)
}
