//! Stored job record.
//!
//! A job record is the store's view of a scheduled job: the payload has
//! already been serialized by the scheduler, the store only moves bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// A scheduled job as persisted in the job store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Unique identifier (ULID string)
    pub id: String,

    /// Cancellation group shared by related jobs
    pub group: String,

    /// Name binding the job to its executor at due time
    pub name: String,

    /// Serialized payload
    pub payload: Vec<u8>,

    /// When the job becomes due
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub trigger_at: DateTime<Utc>,

    /// Retry attempt counter, 0 for a first execution
    #[serde(default)]
    pub attempt: u32,
}

impl JobRecord {
    /// Create a new first-attempt record with a fresh id
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        payload: Vec<u8>,
        trigger_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Ulid::new().to_string(),
            group: group.into(),
            name: name.into(),
            payload,
            trigger_at,
            attempt: 0,
        }
    }

    /// An equivalent job under a fresh id, for re-submission
    pub fn resubmission(&self, attempt: u32, trigger_at: DateTime<Utc>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            group: self.group.clone(),
            name: self.name.clone(),
            payload: self.payload.clone(),
            trigger_at,
            attempt,
        }
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resubmission_keeps_identity_fields() {
        let record = JobRecord::new(
            "ABC123_evidenceReminder",
            "evidenceReminder",
            b"{}".to_vec(),
            Utc::now(),
        );
        let later = record.trigger_at + chrono::Duration::seconds(300);
        let retry = record.resubmission(1, later);

        assert_ne!(retry.id, record.id);
        assert_eq!(retry.group, record.group);
        assert_eq!(retry.name, record.name);
        assert_eq!(retry.payload, record.payload);
        assert_eq!(retry.attempt, 1);
        assert_eq!(retry.trigger_at, later);
    }

    #[test]
    fn test_missing_attempt_defaults_to_zero() {
        let json = r#"{"id":"01HN4QXKN6YWXVKZ3JMHP4BCDE","group":"g","name":"n","payload":[],"trigger_at":0}"#;
        let record = JobRecord::from_bytes(json.as_bytes()).unwrap();
        assert_eq!(record.attempt, 0);
    }
}
