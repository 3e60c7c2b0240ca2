//! # notify-types
//!
//! Shared domain types for the case notification engine.
//!
//! This crate defines the data structures passed between the router,
//! the reminder handlers and the job scheduler:
//! - Events: the closed set of case event types and history records
//! - Case snapshots: subscriptions, hearings and event history of a case
//! - Settings: layered configuration for the daemon and its components
//!
//! ## Usage
//!
//! ```rust
//! use notify_types::{CaseSnapshot, EventType};
//!
//! let snapshot = CaseSnapshot::new("ABC123");
//! assert!(snapshot.latest_event_date(EventType::AppealReceived).is_none());
//! ```

pub mod case;
pub mod config;
pub mod error;
pub mod event;

pub use case::{
    CaseEvent, CaseSnapshot, Channel, Hearing, OtherParty, Party, Subscription, Subscriptions,
};
pub use config::{ReminderSettings, RetrySettings, SchedulerSettings, Settings};
pub use error::NotifyError;
pub use event::{EventRecord, EventType};
