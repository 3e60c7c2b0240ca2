//! Payload carried by reminder jobs.

use notify_types::EventType;
use serde::{Deserialize, Serialize};

/// What a reminder job needs at due time: which case, which reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPayload {
    pub case_id: String,
    pub event_type: EventType,
}

impl ReminderPayload {
    pub fn new(case_id: impl Into<String>, event_type: EventType) -> Self {
        Self {
            case_id: case_id.into(),
            event_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_wire_format() {
        let payload = ReminderPayload::new("ABC123", EventType::HearingReminder);
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"caseId":"ABC123","eventType":"hearingReminder"}"#);
    }
}
