//! Due-job dispatch with retry.
//!
//! The dispatcher is the only component that reads due jobs out of the
//! store. Each due record is claimed by deleting it, so a record is
//! executed at most once even when dispatch passes overlap. A failed
//! execution is either resubmitted under the retry policy or dropped.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use futures::FutureExt;
use notify_storage::JobRecord;
use tracing::{debug, error, info, warn};

use crate::registry::{DispatchRegistry, JobResult};
use crate::retry::RetryPolicy;
use crate::scheduler::JobScheduler;
use crate::serializer::PayloadSerializer;
use crate::SchedulerError;

/// Error type returned by job executors.
pub type ExecutionError = Box<dyn std::error::Error + Send + Sync>;

/// Executes the payload of a due job.
#[async_trait]
pub trait JobExecutor<P>: Send + Sync {
    /// Run the job. An error triggers the retry policy.
    async fn execute(&self, payload: P) -> Result<(), ExecutionError>;
}

#[async_trait]
trait BoundExecutor: Send + Sync {
    async fn run(&self, bytes: &[u8]) -> Result<(), ExecutionError>;
}

struct Binding<P> {
    serializer: Arc<dyn PayloadSerializer<P>>,
    executor: Arc<dyn JobExecutor<P>>,
}

#[async_trait]
impl<P: Send + 'static> BoundExecutor for Binding<P> {
    async fn run(&self, bytes: &[u8]) -> Result<(), ExecutionError> {
        let payload = self.serializer.deserialize(bytes)?;
        self.executor.execute(payload).await
    }
}

/// What happened to one due job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Executed successfully
    Succeeded,
    /// Failed and was resubmitted
    Retried {
        /// Id of the resubmitted job
        job_id: String,
        /// Attempt number of the resubmission
        attempt: u32,
    },
    /// Failed with no attempts left
    Dropped {
        /// Attempt number that failed
        attempt: u32,
    },
    /// Already claimed or removed by someone else
    Skipped,
}

/// Counts of outcomes for one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub succeeded: usize,
    pub retried: usize,
    pub dropped: usize,
    pub skipped: usize,
}

impl DispatchSummary {
    fn record(&mut self, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Succeeded => self.succeeded += 1,
            DispatchOutcome::Retried { .. } => self.retried += 1,
            DispatchOutcome::Dropped { .. } => self.dropped += 1,
            DispatchOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Total due jobs seen in the pass.
    pub fn total(&self) -> usize {
        self.succeeded + self.retried + self.dropped + self.skipped
    }
}

/// Runs due jobs through the executors bound to their names.
pub struct JobDispatcher {
    scheduler: JobScheduler,
    retry_policy: RetryPolicy,
    executors: HashMap<String, Arc<dyn BoundExecutor>>,
    registry: Arc<DispatchRegistry>,
}

impl JobDispatcher {
    /// Create a dispatcher that resubmits failures through `scheduler`.
    pub fn new(scheduler: JobScheduler, retry_policy: RetryPolicy) -> Self {
        Self {
            scheduler,
            retry_policy,
            executors: HashMap::new(),
            registry: Arc::new(DispatchRegistry::new()),
        }
    }

    /// Bind an executor to jobs named `name` with payload type `P`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::DuplicateExecutor` if `name` is already bound,
    /// or `SchedulerError::NoSerializer` if `P` has no registered serializer.
    pub fn bind<P: Send + 'static>(
        &mut self,
        name: &str,
        executor: Arc<dyn JobExecutor<P>>,
    ) -> Result<(), SchedulerError> {
        if self.executors.contains_key(name) {
            return Err(SchedulerError::DuplicateExecutor(name.to_string()));
        }
        let serializer = self.scheduler.serializers().get::<P>()?;
        self.executors.insert(
            name.to_string(),
            Arc::new(Binding {
                serializer,
                executor,
            }),
        );
        self.registry.register(name);
        debug!(job = %name, "Executor bound");
        Ok(())
    }

    /// Execution status per job name.
    pub fn registry(&self) -> Arc<DispatchRegistry> {
        self.registry.clone()
    }

    /// Dispatch every job due at or before `now`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::DispatchFailed` if due jobs cannot be listed.
    /// Failures of individual jobs are reflected in the summary instead.
    pub async fn dispatch_due(&self, now: DateTime<Utc>) -> Result<DispatchSummary, SchedulerError> {
        let due = self
            .scheduler
            .store()
            .list_due(now)
            .map_err(|e| SchedulerError::DispatchFailed(e.to_string()))?;

        if due.is_empty() {
            return Ok(DispatchSummary::default());
        }
        debug!(count = due.len(), "Dispatching due jobs");

        let outcomes = join_all(due.into_iter().map(|record| self.dispatch(record, now))).await;

        let mut summary = DispatchSummary::default();
        for outcome in &outcomes {
            summary.record(outcome);
        }
        info!(
            succeeded = summary.succeeded,
            retried = summary.retried,
            dropped = summary.dropped,
            skipped = summary.skipped,
            "Dispatch pass complete"
        );
        Ok(summary)
    }

    /// Claim and execute one due job.
    pub async fn dispatch(&self, record: JobRecord, now: DateTime<Utc>) -> DispatchOutcome {
        match self.scheduler.store().delete_by_id(&record.id) {
            Ok(true) => {}
            Ok(false) => return DispatchOutcome::Skipped,
            Err(e) => {
                warn!(job_id = %record.id, error = %e, "Failed to claim due job");
                return DispatchOutcome::Skipped;
            }
        }

        self.registry.record_start(&record.name);
        let start = Instant::now();

        // Panics count as failures: the record is already claimed.
        let result = match self.executors.get(&record.name) {
            Some(executor) => match AssertUnwindSafe(executor.run(&record.payload))
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!(
                        job_id = %record.id,
                        group = %record.group,
                        panic_msg = %message,
                        "Executor panicked"
                    );
                    Err(format!("executor panicked: {}", message).into())
                }
            },
            None => Err(format!("no executor bound for job name {}", record.name).into()),
        };

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        match result {
            Ok(()) => {
                self.registry
                    .record_complete(&record.name, JobResult::Success, duration_ms);
                debug!(job_id = %record.id, group = %record.group, "Job executed");
                DispatchOutcome::Succeeded
            }
            Err(e) => {
                self.registry.record_complete(
                    &record.name,
                    JobResult::Failed(e.to_string()),
                    duration_ms,
                );
                self.handle_failure(&record, now, &e.to_string())
            }
        }
    }

    fn handle_failure(&self, record: &JobRecord, now: DateTime<Utc>, reason: &str) -> DispatchOutcome {
        let Some(next) = self.retry_policy.next_attempt(record, now) else {
            warn!(
                job_id = %record.id,
                group = %record.group,
                attempt = record.attempt,
                error = %reason,
                "Job dropped after final attempt"
            );
            self.registry.record_drop(&record.name);
            return DispatchOutcome::Dropped {
                attempt: record.attempt,
            };
        };

        match self.scheduler.submit(&next) {
            Ok(()) => {
                warn!(
                    job_id = %record.id,
                    group = %record.group,
                    attempt = record.attempt,
                    retry_at = %next.trigger_at,
                    error = %reason,
                    "Job failed, retry scheduled"
                );
                self.registry.record_retry(&record.name);
                DispatchOutcome::Retried {
                    job_id: next.id,
                    attempt: next.attempt,
                }
            }
            Err(e) => {
                error!(
                    job_id = %record.id,
                    group = %record.group,
                    error = %e,
                    "Failed to resubmit job for retry"
                );
                self.registry.record_drop(&record.name);
                DispatchOutcome::Dropped {
                    attempt: record.attempt,
                }
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
