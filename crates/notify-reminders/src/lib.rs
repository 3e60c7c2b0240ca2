//! Reminder scheduling for the case notification engine.
//!
//! When a case event arrives, removers cancel reminder groups the event has
//! made obsolete and handlers schedule the reminders it starts:
//!
//! | Reminder | Scheduled by | Anchor |
//! |---|---|---|
//! | `dwpResponseLateReminder` | `appealReceived` | appeal received + delay |
//! | `evidenceReminder` | `dwpResponseReceived` | DWP response + delay |
//! | hearing holding chain (4) | `dwpResponseReceived` | previous stage + delay |
//! | `hearingReminder` (2) | `hearingBooked` | first hearing - offset |
//!
//! Jobs are grouped per case and reminder as `{caseId}_{eventId}`.

pub mod error;
pub mod extractor;
pub mod group_key;
pub mod handlers;
pub mod payload;
pub mod removers;
pub mod service;

pub use error::ReminderError;
pub use extractor::{DateExtractor, EventDateExtractor, HearingDateExtractor};
pub use group_key::job_group;
pub use handlers::{AnchoredReminder, HearingHoldingReminder, HearingReminder, ReminderHandler};
pub use payload::ReminderPayload;
pub use removers::{GroupRemover, ReminderRemover};
pub use service::{ReminderOutcome, ReminderService};
