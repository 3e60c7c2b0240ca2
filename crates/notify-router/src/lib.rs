//! Immediate notification routing for case events.
//!
//! Given the old and new snapshot of a case and the triggering event, the
//! router decides which party gets which notification on which channel.
//! Subscription updates are diffed per party and channel to find new
//! subscriptions and changed addresses.

pub mod decision;
pub mod diff;
pub mod eligibility;
pub mod router;

pub use decision::{NotificationDecision, NotificationType};
pub use diff::{diff_channel, diff_subscription, ChannelChange};
pub use eligibility::{audiences, eligible_parties, Audience};
pub use router::NotificationRouter;
