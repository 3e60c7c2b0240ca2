//! Subscription diffing between the old and new snapshot of a party.

use notify_types::{Channel, Subscription};

/// How one channel of a party's subscription changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelChange {
    /// Not deliverable before, deliverable now
    Subscribed { address: String },
    /// Deliverable before and now, at a different address
    AddressChanged { old: String, new: String },
    /// Deliverable before and now, at the same address
    Unchanged,
    /// Deliverable before, not now
    Unsubscribed,
    /// Deliverable neither before nor now
    Inactive,
}

/// Compare one channel. A party missing from the old snapshot counts as
/// unsubscribed everywhere.
pub fn diff_channel(
    old: Option<&Subscription>,
    new: &Subscription,
    channel: Channel,
) -> ChannelChange {
    let before = old.and_then(|s| s.destination(channel));
    let after = new.destination(channel);
    match (before, after) {
        (None, Some(address)) => ChannelChange::Subscribed {
            address: address.to_string(),
        },
        (Some(old), Some(new)) if old != new => ChannelChange::AddressChanged {
            old: old.to_string(),
            new: new.to_string(),
        },
        (Some(_), Some(_)) => ChannelChange::Unchanged,
        (Some(_), None) => ChannelChange::Unsubscribed,
        (None, None) => ChannelChange::Inactive,
    }
}

/// Compare every channel, in channel order. Structurally equal
/// subscriptions never report a change.
pub fn diff_subscription(
    old: Option<&Subscription>,
    new: &Subscription,
) -> Vec<(Channel, ChannelChange)> {
    if old == Some(new) {
        return Channel::ALL
            .into_iter()
            .map(|channel| {
                let change = if new.destination(channel).is_some() {
                    ChannelChange::Unchanged
                } else {
                    ChannelChange::Inactive
                };
                (channel, change)
            })
            .collect();
    }
    Channel::ALL
        .into_iter()
        .map(|channel| (channel, diff_channel(old, new, channel)))
        .collect()
}
