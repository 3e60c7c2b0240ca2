//! Key encoding and decoding for storage layer.
//!
//! Key formats:
//! - job record:   `job:{ulid}`
//! - group member: `grp:{escaped group}:{ulid}`
//! - due index:    `due:{trigger_ms:013}:{ulid}`
//!
//! The due key zero-pads the trigger time to 13 digits so lexicographic
//! order matches time order, enabling range scans up to "now".

use crate::error::StorageError;
use ulid::Ulid;

/// Key for a job record
/// Format: job:{ulid}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobKey {
    /// Job id
    pub ulid: Ulid,
}

impl JobKey {
    /// Create a key from a job id string
    pub fn from_job_id(job_id: &str) -> Result<Self, StorageError> {
        let ulid: Ulid = job_id
            .parse()
            .map_err(|e| StorageError::Key(format!("Invalid job_id ULID: {}", e)))?;
        Ok(Self { ulid })
    }

    /// Encode key to bytes for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("job:{}", self.ulid).into_bytes()
    }
}

/// Key for a group membership entry
/// Format: grp:{escaped group}:{ulid}
///
/// `%` and `:` in the group are percent-escaped, so any non-empty group
/// (case ids included) is accepted and one group's prefix never matches
/// another group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupKey {
    /// Job group
    pub group: String,
    /// Member job id
    pub ulid: Ulid,
}

impl GroupKey {
    /// Create a group key
    pub fn new(group: &str, ulid: Ulid) -> Result<Self, StorageError> {
        Self::validate_group(group)?;
        Ok(Self {
            group: group.to_string(),
            ulid,
        })
    }

    /// Group names must be non-empty
    pub fn validate_group(group: &str) -> Result<(), StorageError> {
        if group.is_empty() {
            return Err(StorageError::Key("Empty job group".to_string()));
        }
        Ok(())
    }

    fn escape(group: &str) -> String {
        group.replace('%', "%25").replace(':', "%3A")
    }

    fn unescape(escaped: &str) -> String {
        escaped.replace("%3A", ":").replace("%25", "%")
    }

    /// Encode key to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("grp:{}:{}", Self::escape(&self.group), self.ulid).into_bytes()
    }

    /// Prefix shared by every member of `group`
    pub fn prefix(group: &str) -> Result<Vec<u8>, StorageError> {
        Self::validate_group(group)?;
        Ok(format!("grp:{}:", Self::escape(group)).into_bytes())
    }

    /// Decode key from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::Key(format!("Invalid UTF-8: {}", e)))?;

        let rest = s
            .strip_prefix("grp:")
            .ok_or_else(|| StorageError::Key(format!("Invalid group key format: {}", s)))?;
        let (group, id) = rest
            .rsplit_once(':')
            .ok_or_else(|| StorageError::Key(format!("Invalid group key format: {}", s)))?;
        let ulid: Ulid = id
            .parse()
            .map_err(|e| StorageError::Key(format!("Invalid ULID: {}", e)))?;

        Self::new(&Self::unescape(group), ulid)
    }
}

/// Key for the trigger-time index
/// Format: due:{trigger_ms:013}:{ulid}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueKey {
    /// Trigger time in milliseconds since Unix epoch
    pub trigger_ms: i64,
    /// Job id
    pub ulid: Ulid,
}

impl DueKey {
    /// Largest trigger time the fixed-width encoding can order
    pub const MAX_TRIGGER_MS: i64 = 9_999_999_999_999;

    /// Create a due key; trigger times outside the 13-digit range cannot be ordered
    pub fn new(trigger_ms: i64, ulid: Ulid) -> Result<Self, StorageError> {
        if !(0..=Self::MAX_TRIGGER_MS).contains(&trigger_ms) {
            return Err(StorageError::Key(format!(
                "Trigger time out of range: {}",
                trigger_ms
            )));
        }
        Ok(Self { trigger_ms, ulid })
    }

    /// Encode key to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("due:{:013}:{}", self.trigger_ms, self.ulid).into_bytes()
    }

    /// Decode key from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::Key(format!("Invalid UTF-8: {}", e)))?;
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 || parts[0] != "due" {
            return Err(StorageError::Key(format!("Invalid due key format: {}", s)));
        }

        let trigger_ms: i64 = parts[1]
            .parse()
            .map_err(|e| StorageError::Key(format!("Invalid timestamp: {}", e)))?;
        let ulid: Ulid = parts[2]
            .parse()
            .map_err(|e| StorageError::Key(format!("Invalid ULID: {}", e)))?;

        Self::new(trigger_ms, ulid)
    }

    /// Exclusive upper bound for a scan of everything due at or before `until_ms`
    pub fn prefix_end(until_ms: i64) -> Vec<u8> {
        if until_ms >= Self::MAX_TRIGGER_MS {
            // ';' sorts directly after ':', above every due key
            return b"due;".to_vec();
        }
        format!("due:{:013}:", until_ms.saturating_add(1).max(0)).into_bytes()
    }
}
