//! Logical job definition.

use chrono::{DateTime, Utc};

/// A job to schedule: a typed payload that becomes due at `trigger_at`.
///
/// `name` binds the job to its executor at due time; `group` is the unit
/// of cancellation shared with related jobs.
#[derive(Debug, Clone, PartialEq)]
pub struct Job<P> {
    /// Cancellation group
    pub group: String,
    /// Executor binding name
    pub name: String,
    /// Typed payload, serialized on scheduling
    pub payload: P,
    /// When the job becomes due
    pub trigger_at: DateTime<Utc>,
}

impl<P> Job<P> {
    /// Create a new job
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        payload: P,
        trigger_at: DateTime<Utc>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            payload,
            trigger_at,
        }
    }
}
