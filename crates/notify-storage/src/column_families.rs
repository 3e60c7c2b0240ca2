//! Column family definitions for RocksDB.
//!
//! Each column family isolates data with different access patterns:
//! - jobs: job records keyed by job id (point lookups)
//! - job_groups: group membership index, prefix-scanned per group
//! - job_due: trigger-time index, range-scanned by the dispatcher

use rocksdb::{ColumnFamilyDescriptor, Options};

/// Column family name for job records
pub const CF_JOBS: &str = "jobs";

/// Column family name for the group membership index
pub const CF_JOB_GROUPS: &str = "job_groups";

/// Column family name for the trigger-time index
pub const CF_JOB_DUE: &str = "job_due";

/// All column family names
pub const ALL_CF_NAMES: &[&str] = &[CF_JOBS, CF_JOB_GROUPS, CF_JOB_DUE];

/// Create column family options for job records (compressed payloads)
fn jobs_options() -> Options {
    let mut opts = Options::default();
    opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
    opts
}

/// Build all column family descriptors
pub fn build_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    vec![
        ColumnFamilyDescriptor::new(CF_JOBS, jobs_options()),
        ColumnFamilyDescriptor::new(CF_JOB_GROUPS, Options::default()),
        ColumnFamilyDescriptor::new(CF_JOB_DUE, Options::default()),
    ]
}
