//! Routing output: who gets which notification on which channel.

use std::fmt;

use notify_types::{Channel, EventType, Party};
use serde::{Deserialize, Serialize};

/// Kind of notification to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "event")]
pub enum NotificationType {
    /// The notification for a case event
    Event(EventType),
    /// Welcome on a channel that was just subscribed
    SubscriptionCreated,
    /// Confirmation sent to a party's new address
    SubscriptionUpdated,
    /// Notice sent to the address a party moved away from
    SubscriptionOld,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationType::Event(event_type) => write!(f, "{}", event_type),
            NotificationType::SubscriptionCreated => write!(f, "subscriptionCreated"),
            NotificationType::SubscriptionUpdated => write!(f, "subscriptionUpdated"),
            NotificationType::SubscriptionOld => write!(f, "subscriptionOld"),
        }
    }
}

/// One notification to hand to a channel sender.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationDecision {
    pub party: Party,
    pub channel: Channel,
    pub notification: NotificationType,
    /// Email address or mobile number to deliver to
    pub destination: String,
}

impl NotificationDecision {
    pub fn new(
        party: Party,
        channel: Channel,
        notification: NotificationType,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            party,
            channel,
            notification,
            destination: destination.into(),
        }
    }
}

impl fmt::Display for NotificationDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} via {} to {} ({})",
            self.notification, self.channel, self.party, self.destination
        )
    }
}
