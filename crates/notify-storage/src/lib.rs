//! Job store for the case notification engine.
//!
//! Provides RocksDB-backed storage of scheduled jobs with:
//! - Column family isolation for job records, group membership and the due index
//! - Time-prefixed due keys for efficient "what is due now" scans
//! - Atomic writes via WriteBatch, so a group is never observed half-written
//! - Group-wise removal of every job sharing a group key

pub mod column_families;
pub mod db;
pub mod error;
pub mod job;
pub mod keys;
pub mod store;

pub use db::{Storage, StorageStats};
pub use error::StorageError;
pub use job::JobRecord;
pub use keys::{DueKey, GroupKey, JobKey};
pub use store::JobStore;
