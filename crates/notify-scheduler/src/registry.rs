//! Dispatch registry: per-job-name execution status.
//!
//! The dispatcher records every execution here so the daemon can report
//! how each kind of reminder job has fared, including silent drops.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a job execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobResult {
    /// Job completed successfully
    Success,
    /// Job failed with an error message
    Failed(String),
}

/// Status of the jobs bound to one name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    /// Job name the executor is bound to
    pub job_name: String,
    /// When a job with this name last started (if ever)
    pub last_run: Option<DateTime<Utc>>,
    /// Duration of the last run in milliseconds
    pub last_duration_ms: Option<u64>,
    /// Result of the last execution
    pub last_result: Option<JobResult>,
    /// Total number of executions
    pub run_count: u64,
    /// Total number of failed executions
    pub error_count: u64,
    /// Failures that were resubmitted
    pub retry_count: u64,
    /// Failures that exhausted their attempts and were dropped
    pub dropped_count: u64,
    /// Executions currently in flight
    pub running: u32,
}

impl JobStatus {
    /// Create an empty status for `job_name`.
    pub fn new(job_name: String) -> Self {
        Self {
            job_name,
            last_run: None,
            last_duration_ms: None,
            last_result: None,
            run_count: 0,
            error_count: 0,
            retry_count: 0,
            dropped_count: 0,
            running: 0,
        }
    }

    /// Whether any execution is in flight.
    pub fn is_running(&self) -> bool {
        self.running > 0
    }
}

/// Registry of execution status, keyed by job name.
///
/// Updates for names that were never registered are ignored.
///
/// # Example
///
/// ```
/// use notify_scheduler::{DispatchRegistry, JobResult};
///
/// let registry = DispatchRegistry::new();
/// registry.register("hearingReminder");
///
/// registry.record_start("hearingReminder");
/// registry.record_complete("hearingReminder", JobResult::Success, 12);
///
/// let status = registry.get_status("hearingReminder").unwrap();
/// assert_eq!(status.run_count, 1);
/// ```
pub struct DispatchRegistry {
    jobs: RwLock<HashMap<String, JobStatus>>,
}

impl DispatchRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Register a job name. Existing status is reset.
    pub fn register(&self, job_name: &str) {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        jobs.insert(job_name.to_string(), JobStatus::new(job_name.to_string()));
    }

    fn update(&self, job_name: &str, f: impl FnOnce(&mut JobStatus)) {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(status) = jobs.get_mut(job_name) {
            f(status);
        }
    }

    /// Record that an execution has started.
    pub fn record_start(&self, job_name: &str) {
        self.update(job_name, |status| {
            status.running += 1;
            status.last_run = Some(Utc::now());
        });
    }

    /// Record that an execution has finished.
    pub fn record_complete(&self, job_name: &str, result: JobResult, duration_ms: u64) {
        self.update(job_name, |status| {
            status.running = status.running.saturating_sub(1);
            status.last_duration_ms = Some(duration_ms);
            status.run_count += 1;
            if matches!(result, JobResult::Failed(_)) {
                status.error_count += 1;
            }
            status.last_result = Some(result);
        });
    }

    /// Record that a failed job was resubmitted.
    pub fn record_retry(&self, job_name: &str) {
        self.update(job_name, |status| status.retry_count += 1);
    }

    /// Record that a failed job was dropped.
    pub fn record_drop(&self, job_name: &str) {
        self.update(job_name, |status| status.dropped_count += 1);
    }

    /// Get the status of one job name.
    pub fn get_status(&self, job_name: &str) -> Option<JobStatus> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(job_name)
            .cloned()
    }

    /// Get the status of every registered job name, sorted by name.
    pub fn get_all_status(&self) -> Vec<JobStatus> {
        let mut all: Vec<JobStatus> = self
            .jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.job_name.cmp(&b.job_name));
        all
    }

    /// Check if a job name is registered.
    pub fn is_registered(&self, job_name: &str) -> bool {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(job_name)
    }

    /// Number of registered job names.
    pub fn job_count(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for DispatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}
