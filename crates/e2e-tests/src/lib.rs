//! End-to-end test infrastructure for the case notification engine.
//!
//! Provides a shared TestHarness and helpers for scenarios that cover the
//! whole path from inbound case event to due reminder execution.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use notify_daemon::Engine;
use notify_reminders::ReminderPayload;
use notify_scheduler::{ExecutionError, JobExecutor};
use notify_storage::{JobRecord, JobStore, Storage};
use notify_types::{CaseEvent, CaseSnapshot, EventType, Settings};

/// Shared test harness for E2E tests.
///
/// Owns a temporary RocksDB job store and an engine wired to it.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Shared job store
    pub storage: Arc<Storage>,
    /// Engine under test
    pub engine: Engine,
}

impl TestHarness {
    /// Harness with default settings.
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Harness with the given settings; `db_path` is replaced by a temp dir.
    pub fn with_settings(settings: Settings) -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let storage =
            Arc::new(Storage::open(temp_dir.path()).expect("Failed to open test storage"));
        let engine = Engine::new(&settings, storage.clone()).expect("Invalid test settings");

        Self {
            _temp_dir: temp_dir,
            storage,
            engine,
        }
    }

    /// Process an event, panicking on failure.
    pub fn process(&self, event_type: EventType, snapshot: &CaseSnapshot) {
        self.engine
            .process(&CaseEvent::new(event_type, None, snapshot.clone()))
            .expect("Failed to process event");
    }

    /// Jobs in a group, sorted by trigger time.
    pub fn group(&self, group: &str) -> Vec<JobRecord> {
        let mut jobs = self
            .storage
            .list_by_group(group)
            .expect("Failed to list group");
        jobs.sort_by_key(|job| job.trigger_at);
        jobs
    }

    /// Every stored job, earliest first.
    pub fn all_jobs(&self) -> Vec<JobRecord> {
        self.storage
            .list_due(DateTime::<Utc>::MAX_UTC)
            .expect("Failed to list jobs")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an RFC 3339 timestamp.
pub fn ts(s: &str) -> DateTime<Utc> {
    s.parse().expect("Invalid test timestamp")
}

/// Executor that records every reminder it runs.
#[derive(Default)]
pub struct RecordingExecutor {
    seen: Mutex<Vec<ReminderPayload>>,
}

impl RecordingExecutor {
    pub fn seen(&self) -> Vec<ReminderPayload> {
        self.seen.lock().expect("poisoned").clone()
    }
}

#[async_trait]
impl JobExecutor<ReminderPayload> for RecordingExecutor {
    async fn execute(&self, payload: ReminderPayload) -> Result<(), ExecutionError> {
        self.seen.lock().expect("poisoned").push(payload);
        Ok(())
    }
}

/// Executor that fails its first `failures` calls, then succeeds.
pub struct FlakyExecutor {
    failures: u32,
    calls: AtomicU32,
}

impl FlakyExecutor {
    pub fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
        }
    }

    /// Executor that never succeeds.
    pub fn always_failing() -> Self {
        Self::new(u32::MAX)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobExecutor<ReminderPayload> for FlakyExecutor {
    async fn execute(&self, payload: ReminderPayload) -> Result<(), ExecutionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(format!("notification gateway down for {}", payload.case_id).into());
        }
        Ok(())
    }
}
