//! Reminder job scheduling for the case notification engine.
//!
//! - `JobScheduler` stores typed jobs as serialized records in a `JobStore`
//! - `JobRemover` cancels jobs by id or by group
//! - `JobDispatcher` executes due jobs through executors bound by job name,
//!   resubmitting failures under a `RetryPolicy`
//! - `SchedulerService` runs the dispatch pass on a cron schedule via
//!   `tokio-cron-scheduler`, with graceful shutdown
//!
//! # Example
//!
//! ```ignore
//! use notify_scheduler::{JobDispatcher, JobScheduler, RetryPolicy, SchedulerService, SerializerRegistry};
//!
//! let serializers = Arc::new(SerializerRegistry::new().with_json::<ReminderPayload>());
//! let scheduler = JobScheduler::new(store, serializers);
//!
//! let mut dispatcher = JobDispatcher::new(scheduler.clone(), RetryPolicy::from_settings(&settings.retry));
//! dispatcher.bind::<ReminderPayload>("hearingReminder", executor)?;
//!
//! let service = SchedulerService::new(settings.scheduler).await?;
//! service.register_dispatcher(Arc::new(dispatcher)).await?;
//! service.start().await?;
//! ```

mod dispatcher;
mod error;
mod job;
mod registry;
mod remover;
mod retry;
mod scheduler;
mod serializer;
mod service;

pub use dispatcher::{DispatchOutcome, DispatchSummary, ExecutionError, JobDispatcher, JobExecutor};
pub use error::SchedulerError;
pub use job::Job;
pub use registry::{DispatchRegistry, JobResult, JobStatus};
pub use remover::JobRemover;
pub use retry::RetryPolicy;
pub use scheduler::JobScheduler;
pub use serializer::{JsonSerializer, PayloadSerializer, SerializerRegistry};
pub use service::{validate_cron_expression, SchedulerService};

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use chrono::{DateTime, Utc};
    use notify_storage::{JobRecord, JobStore, Storage, StorageError};
    use tempfile::TempDir;

    pub fn open_store() -> (Arc<dyn JobStore>, TempDir) {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();
        (Arc::new(storage), temp)
    }

    /// Store whose every operation fails.
    pub struct FailingStore;

    fn fault() -> StorageError {
        StorageError::Serialization("disk full".to_string())
    }

    impl JobStore for FailingStore {
        fn put(&self, _record: &JobRecord) -> Result<(), StorageError> {
            Err(fault())
        }

        fn get(&self, _id: &str) -> Result<Option<JobRecord>, StorageError> {
            Err(fault())
        }

        fn delete_by_id(&self, _id: &str) -> Result<bool, StorageError> {
            Err(fault())
        }

        fn delete_by_group(&self, _group: &str) -> Result<Vec<String>, StorageError> {
            Err(fault())
        }

        fn list_by_group(&self, _group: &str) -> Result<Vec<JobRecord>, StorageError> {
            Err(fault())
        }

        fn list_due(&self, _until: DateTime<Utc>) -> Result<Vec<JobRecord>, StorageError> {
            Err(fault())
        }
    }
}
