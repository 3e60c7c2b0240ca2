//! The job store contract.
//!
//! The scheduler, remover and dispatcher depend on this trait rather than
//! on RocksDB directly, so alternative backends can be plugged in.

use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::job::JobRecord;

/// Durable store of scheduled jobs keyed by job id and job group.
///
/// Implementations are shared between inbound event handling and the
/// background dispatcher, so they must be safe to call concurrently.
/// `delete_by_group` must be atomic with respect to `put` into the same
/// group: it never removes a partial membership set.
pub trait JobStore: Send + Sync {
    /// Store a job record.
    fn put(&self, record: &JobRecord) -> Result<(), StorageError>;

    /// Fetch a job record by id.
    fn get(&self, id: &str) -> Result<Option<JobRecord>, StorageError>;

    /// Delete a job by id. Returns false if no such job existed.
    fn delete_by_id(&self, id: &str) -> Result<bool, StorageError>;

    /// Delete every job in `group`. Returns the removed ids; empty means
    /// the group was not found.
    fn delete_by_group(&self, group: &str) -> Result<Vec<String>, StorageError>;

    /// List the jobs in `group`.
    fn list_by_group(&self, group: &str) -> Result<Vec<JobRecord>, StorageError>;

    /// List the jobs whose trigger time is at or before `until`, earliest first.
    fn list_due(&self, until: DateTime<Utc>) -> Result<Vec<JobRecord>, StorageError>;
}
