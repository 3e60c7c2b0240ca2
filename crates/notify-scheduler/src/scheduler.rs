//! Job scheduler: turns logical jobs into stored job records.

use std::sync::Arc;

use notify_storage::{JobRecord, JobStore};
use tracing::info;

use crate::job::Job;
use crate::serializer::SerializerRegistry;
use crate::SchedulerError;

/// Schedules jobs into the job store, assigning ids.
///
/// Every failure, whether serialization or store I/O, surfaces as a single
/// opaque `SchedulerError::SchedulingFailed`.
#[derive(Clone)]
pub struct JobScheduler {
    store: Arc<dyn JobStore>,
    serializers: Arc<SerializerRegistry>,
}

impl JobScheduler {
    /// Create a scheduler over `store` using `serializers` for payloads.
    pub fn new(store: Arc<dyn JobStore>, serializers: Arc<SerializerRegistry>) -> Self {
        Self { store, serializers }
    }

    /// Schedule a job and return its id.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::SchedulingFailed` if the payload cannot be
    /// serialized or the store rejects the write.
    pub fn schedule<P: 'static>(&self, job: &Job<P>) -> Result<String, SchedulerError> {
        let payload = self
            .serializers
            .get::<P>()
            .and_then(|serializer| serializer.serialize(&job.payload))
            .map_err(|e| SchedulerError::SchedulingFailed(format!("{}: {}", job.group, e)))?;

        let record = JobRecord::new(&job.group, &job.name, payload, job.trigger_at);
        self.submit(&record)?;
        Ok(record.id)
    }

    /// Store an already-serialized job record, e.g. a retry re-submission.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::SchedulingFailed` if the store rejects the write.
    pub fn submit(&self, record: &JobRecord) -> Result<(), SchedulerError> {
        self.store
            .put(record)
            .map_err(|e| SchedulerError::SchedulingFailed(format!("{}: {}", record.group, e)))?;

        info!(
            job_id = %record.id,
            group = %record.group,
            name = %record.name,
            trigger_at = %record.trigger_at,
            attempt = record.attempt,
            "Job scheduled"
        );
        Ok(())
    }

    /// The underlying job store.
    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// The payload serializer registry.
    pub fn serializers(&self) -> &Arc<SerializerRegistry> {
        &self.serializers
    }
}
