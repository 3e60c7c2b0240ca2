//! RocksDB wrapper implementing the job store.
//!
//! Provides:
//! - Database open with column family setup
//! - Atomic write batches spanning the record, group and due indexes
//! - Group-wise deletion serialized against inserts into the same store
//! - Due-job range scans for the dispatcher

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamily, Direction, IteratorMode, Options, WriteBatch, DB};
use tracing::{debug, info};
use ulid::Ulid;

use crate::column_families::{build_cf_descriptors, ALL_CF_NAMES, CF_JOBS, CF_JOB_DUE, CF_JOB_GROUPS};
use crate::error::StorageError;
use crate::job::JobRecord;
use crate::keys::{DueKey, GroupKey, JobKey};
use crate::store::JobStore;

/// RocksDB-backed job store
pub struct Storage {
    db: DB,
    /// Serializes mutations so group removal never interleaves with an insert
    write_lock: Mutex<()>,
}

impl Storage {
    /// Open storage at the given path, creating if necessary
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening job store at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_background_jobs(2);

        let cf_descriptors = build_cf_descriptors();
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily, StorageError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(name.to_string()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StorageError> {
        self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn read_record(&self, ulid: Ulid) -> Result<Option<JobRecord>, StorageError> {
        let jobs_cf = self.cf(CF_JOBS)?;
        let key = JobKey { ulid };
        match self.db.get_cf(jobs_cf, key.to_bytes())? {
            Some(bytes) => Ok(Some(JobRecord::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Add deletes for every index entry of `record` to `batch`
    fn batch_delete(
        &self,
        batch: &mut WriteBatch,
        record: &JobRecord,
        ulid: Ulid,
    ) -> Result<(), StorageError> {
        let due_key = DueKey::new(record.trigger_at.timestamp_millis(), ulid)?;
        let group_key = GroupKey::new(&record.group, ulid)?;

        batch.delete_cf(self.cf(CF_JOBS)?, JobKey { ulid }.to_bytes());
        batch.delete_cf(self.cf(CF_JOB_GROUPS)?, group_key.to_bytes());
        batch.delete_cf(self.cf(CF_JOB_DUE)?, due_key.to_bytes());
        Ok(())
    }

    fn group_members(&self, group: &str) -> Result<Vec<Ulid>, StorageError> {
        let groups_cf = self.cf(CF_JOB_GROUPS)?;
        let prefix = GroupKey::prefix(group)?;

        let iter = self
            .db
            .iterator_cf(groups_cf, IteratorMode::From(&prefix, Direction::Forward));

        let mut members = Vec::new();
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            members.push(GroupKey::from_bytes(&key)?.ulid);
        }
        Ok(members)
    }

    /// Flush all column families to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        for cf_name in ALL_CF_NAMES {
            if let Some(cf) = self.db.cf_handle(cf_name) {
                self.db.flush_cf(cf)?;
            }
        }
        Ok(())
    }

    /// Get database statistics
    pub fn get_stats(&self) -> Result<StorageStats, StorageError> {
        Ok(StorageStats {
            job_count: self.count_cf_entries(self.cf(CF_JOBS)?)?,
            group_entry_count: self.count_cf_entries(self.cf(CF_JOB_GROUPS)?)?,
            due_entry_count: self.count_cf_entries(self.cf(CF_JOB_DUE)?)?,
        })
    }

    fn count_cf_entries(&self, cf: &ColumnFamily) -> Result<u64, StorageError> {
        let mut count = 0u64;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }
}

impl JobStore for Storage {
    fn put(&self, record: &JobRecord) -> Result<(), StorageError> {
        let job_key = JobKey::from_job_id(&record.id)?;
        let group_key = GroupKey::new(&record.group, job_key.ulid)?;
        let due_key = DueKey::new(record.trigger_at.timestamp_millis(), job_key.ulid)?;
        let bytes = record.to_bytes()?;

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_JOBS)?, job_key.to_bytes(), bytes);
        batch.put_cf(self.cf(CF_JOB_GROUPS)?, group_key.to_bytes(), b"");
        batch.put_cf(self.cf(CF_JOB_DUE)?, due_key.to_bytes(), b"");

        let _guard = self.lock()?;
        self.db.write(batch)?;
        debug!(job_id = %record.id, group = %record.group, name = %record.name, "Stored job");
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<JobRecord>, StorageError> {
        let key = JobKey::from_job_id(id)?;
        self.read_record(key.ulid)
    }

    fn delete_by_id(&self, id: &str) -> Result<bool, StorageError> {
        let key = JobKey::from_job_id(id)?;

        let _guard = self.lock()?;
        let Some(record) = self.read_record(key.ulid)? else {
            return Ok(false);
        };

        let mut batch = WriteBatch::default();
        self.batch_delete(&mut batch, &record, key.ulid)?;
        self.db.write(batch)?;
        debug!(job_id = %id, group = %record.group, "Deleted job");
        Ok(true)
    }

    fn delete_by_group(&self, group: &str) -> Result<Vec<String>, StorageError> {
        let _guard = self.lock()?;

        let mut batch = WriteBatch::default();
        let mut removed = Vec::new();
        for ulid in self.group_members(group)? {
            match self.read_record(ulid)? {
                Some(record) => self.batch_delete(&mut batch, &record, ulid)?,
                // Dangling membership entry; clean it up without counting it.
                None => {
                    batch.delete_cf(self.cf(CF_JOB_GROUPS)?, GroupKey::new(group, ulid)?.to_bytes());
                    continue;
                }
            }
            removed.push(ulid.to_string());
        }

        self.db.write(batch)?;
        debug!(group = %group, count = removed.len(), "Deleted job group");
        Ok(removed)
    }

    fn list_by_group(&self, group: &str) -> Result<Vec<JobRecord>, StorageError> {
        let mut records = Vec::new();
        for ulid in self.group_members(group)? {
            if let Some(record) = self.read_record(ulid)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn list_due(&self, until: DateTime<Utc>) -> Result<Vec<JobRecord>, StorageError> {
        let due_cf = self.cf(CF_JOB_DUE)?;
        let end = DueKey::prefix_end(until.timestamp_millis());

        let mut records = Vec::new();
        for item in self.db.iterator_cf(due_cf, IteratorMode::Start) {
            let (key, _) = item?;
            if key.as_ref() >= end.as_slice() {
                break;
            }
            let due_key = DueKey::from_bytes(&key)?;
            if let Some(record) = self.read_record(due_key.ulid)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

/// Database statistics
#[derive(Debug, Default, Clone)]
pub struct StorageStats {
    /// Number of stored jobs
    pub job_count: u64,
    /// Number of group membership entries
    pub group_entry_count: u64,
    /// Number of due-index entries
    pub due_entry_count: u64,
}
