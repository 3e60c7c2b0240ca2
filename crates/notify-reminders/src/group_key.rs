//! Job group keys shared by reminder scheduling and cancellation.

use notify_types::EventType;

/// The group key for `reminder` jobs on case `case_id`: `{caseId}_{eventId}`.
///
/// Handlers schedule under this key and removers cancel by it, so both
/// sides must derive it here.
pub fn job_group(case_id: &str, reminder: EventType) -> String {
    format!("{}_{}", case_id, reminder.id())
}
