//! Retry policy for failed job executions.

use chrono::{DateTime, Duration, Utc};
use notify_storage::JobRecord;
use notify_types::RetrySettings;

/// Decides whether a failed job is resubmitted, and when.
///
/// A job that failed on attempt `n` is resubmitted as attempt `n + 1`,
/// `backoff` after the failure, while `n < max_attempts`. Otherwise it
/// is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Highest attempt number that may still be retried, exclusive
    pub max_attempts: u32,
    /// Fixed delay between a failure and the next attempt
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Fixed-backoff policy.
    pub fn fixed(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Policy that never retries.
    pub fn none() -> Self {
        Self::fixed(0, Duration::zero())
    }

    /// Build the policy from configuration.
    pub fn from_settings(settings: &RetrySettings) -> Self {
        let backoff = i64::try_from(settings.backoff_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self::fixed(settings.max_attempts, backoff)
    }

    /// Whether a job that failed on `attempt` gets another try.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// The resubmission for a job that failed at `now`, if it gets one.
    pub fn next_attempt(&self, record: &JobRecord, now: DateTime<Utc>) -> Option<JobRecord> {
        if !self.should_retry(record.attempt) {
            return None;
        }
        let trigger_at = now
            .checked_add_signed(self.backoff)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Some(record.resubmission(record.attempt + 1, trigger_at))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&RetrySettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(attempt: u32) -> JobRecord {
        let mut record = JobRecord::new(
            "ABC123_evidenceReminder",
            "evidenceReminder",
            b"{}".to_vec(),
            "2018-01-01T14:01:18Z".parse().unwrap(),
        );
        record.attempt = attempt;
        record
    }

    #[test]
    fn test_retry_until_max_attempts() {
        let policy = RetryPolicy::fixed(3, Duration::minutes(5));
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
        assert!(!policy.should_retry(4));
    }

    #[test]
    fn test_next_attempt_reschedules_after_backoff() {
        let policy = RetryPolicy::fixed(3, Duration::minutes(5));
        let now: DateTime<Utc> = "2018-01-01T15:00:00Z".parse().unwrap();
        let original = record(1);

        let next = policy.next_attempt(&original, now).unwrap();
        assert_eq!(next.attempt, 2);
        assert_eq!(next.trigger_at, now + Duration::minutes(5));
        assert_eq!(next.group, original.group);
        assert_eq!(next.name, original.name);
        assert_eq!(next.payload, original.payload);
        assert_ne!(next.id, original.id);
    }

    #[test]
    fn test_next_attempt_exhausted() {
        let policy = RetryPolicy::fixed(3, Duration::minutes(5));
        assert!(policy.next_attempt(&record(3), Utc::now()).is_none());
    }

    #[test]
    fn test_none_never_retries() {
        assert!(RetryPolicy::none().next_attempt(&record(0), Utc::now()).is_none());
    }

    #[test]
    fn test_from_settings() {
        let policy = RetryPolicy::from_settings(&RetrySettings {
            max_attempts: 5,
            backoff_secs: 60,
        });
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff, Duration::seconds(60));
    }
}
