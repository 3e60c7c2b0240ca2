//! Command implementations for the notification daemon.
//!
//! Handles:
//! - start: Load config, open the job store, run the dispatch schedule
//! - process: Route a case event and apply its reminder changes
//! - jobs / cancel: Inspect and cancel job groups
//! - stats: Job store statistics

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use notify_scheduler::{SchedulerError, SchedulerService};
use notify_storage::{JobStore, Storage};
use notify_types::{CaseEvent, Settings};
use tokio::signal;
use tracing::{info, warn};

use crate::executor::ReminderNotifier;
use crate::pipeline::Engine;

/// Load settings and apply CLI overrides (highest precedence).
pub fn load_settings(
    config_path: Option<&str>,
    db_path_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(db_path) = db_path_override {
        settings.db_path = db_path.to_string();
    }
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }
    Ok(settings)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `level`.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_logging(level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Open (creating if needed) the job store at the configured path.
pub fn open_storage(settings: &Settings) -> Result<Arc<Storage>> {
    let db_path = settings.expanded_db_path();
    info!("Opening job store at {:?}", db_path);

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    let storage = Storage::open(&db_path).context("Failed to open job store")?;
    Ok(Arc::new(storage))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Start the daemon.
///
/// 1. Load configuration (defaults -> file -> env -> CLI)
/// 2. Open the job store
/// 3. Run the dispatch schedule, handing due reminders to the notifier
/// 4. Shut down gracefully on SIGINT/SIGTERM
pub async fn start_daemon(settings: Settings) -> Result<()> {
    info!("Notification daemon starting...");
    info!("  Database path: {}", settings.db_path);
    info!("  Dispatch schedule: {}", settings.scheduler.dispatch_cron);
    info!(
        "  Retry: {} attempts, {}s backoff",
        settings.retry.max_attempts, settings.retry.backoff_secs
    );

    let storage = open_storage(&settings)?;
    let engine = Engine::new(&settings, storage.clone()).context("Invalid reminder settings")?;

    let notifier = Arc::new(ReminderNotifier::new());
    let dispatcher = Arc::new(engine.dispatcher(notifier.clone())?);

    let mut scheduler = SchedulerService::new(settings.scheduler.clone())
        .await
        .context("Failed to create scheduler")?;
    scheduler.register_dispatcher(dispatcher.clone()).await?;
    scheduler.start().await?;

    shutdown_signal().await;

    scheduler.shutdown().await?;
    storage.flush().context("Failed to flush job store")?;

    for status in dispatcher.registry().get_all_status() {
        if status.run_count > 0 {
            info!(
                job = %status.job_name,
                runs = status.run_count,
                errors = status.error_count,
                retries = status.retry_count,
                dropped = status.dropped_count,
                "Dispatch totals"
            );
        }
    }
    info!(delivered = notifier.delivered(), "Notification daemon stopped");
    Ok(())
}

/// Process a case event read from a JSON file and print the report.
pub fn process_event_file(settings: &Settings, path: &Path, dry_run: bool) -> Result<()> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let event: CaseEvent =
        serde_json::from_str(&raw).with_context(|| format!("Invalid case event in {:?}", path))?;

    let storage = open_storage(settings)?;
    let engine = Engine::new(settings, storage.clone()).context("Invalid reminder settings")?;

    let output = if dry_run {
        serde_json::to_string_pretty(&engine.route(&event))?
    } else {
        let report = engine
            .process(&event)
            .context("Failed to apply reminder changes")?;
        storage.flush()?;
        serde_json::to_string_pretty(&report)?
    };
    println!("{}", output);
    Ok(())
}

/// Print the jobs in a group.
pub fn list_jobs(settings: &Settings, group: &str) -> Result<()> {
    let storage = open_storage(settings)?;
    let jobs = storage
        .list_by_group(group)
        .with_context(|| format!("Failed to list group {}", group))?;

    if jobs.is_empty() {
        println!("No jobs in group {}", group);
        return Ok(());
    }
    println!("{:<28} {:<30} {:<26} ATTEMPT", "ID", "NAME", "TRIGGER AT");
    for job in jobs {
        println!(
            "{:<28} {:<30} {:<26} {}",
            job.id,
            job.name,
            job.trigger_at.to_rfc3339(),
            job.attempt
        );
    }
    Ok(())
}

/// Cancel every job in a group.
pub fn cancel_group(settings: &Settings, group: &str) -> Result<()> {
    let storage = open_storage(settings)?;
    let engine = Engine::new(settings, storage.clone()).context("Invalid reminder settings")?;

    match engine.remover().remove_group(group) {
        Ok(removed) => {
            storage.flush()?;
            println!("Cancelled {} job(s) in group {}", removed.len(), group);
            Ok(())
        }
        Err(SchedulerError::GroupNotFound(_)) => {
            println!("No jobs in group {}", group);
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to cancel group {}", group)),
    }
}

/// Print job store statistics.
pub fn show_stats(settings: &Settings) -> Result<()> {
    let storage = open_storage(settings)?;
    let stats = storage.get_stats()?;
    println!("Jobs:              {}", stats.job_count);
    println!("Group entries:     {}", stats.group_entry_count);
    println!("Due index entries: {}", stats.due_entry_count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(temp: &TempDir) -> Settings {
        Settings {
            db_path: temp.path().join("jobs").to_string_lossy().to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_process_then_list_and_cancel() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);

        let event_path = temp.path().join("event.json");
        fs::write(
            &event_path,
            r#"{
                "eventType": "appealReceived",
                "new": {
                    "caseId": "ABC123",
                    "events": [{"type": "appealReceived", "date": "2018-01-01T09:00:00Z"}]
                }
            }"#,
        )
        .unwrap();

        process_event_file(&settings, &event_path, false).unwrap();
        {
            let storage = open_storage(&settings).unwrap();
            assert_eq!(
                storage
                    .list_by_group("ABC123_dwpResponseLateReminder")
                    .unwrap()
                    .len(),
                1
            );
        }

        list_jobs(&settings, "ABC123_dwpResponseLateReminder").unwrap();
        cancel_group(&settings, "ABC123_dwpResponseLateReminder").unwrap();
        // A second cancel finds nothing and still succeeds.
        cancel_group(&settings, "ABC123_dwpResponseLateReminder").unwrap();
        show_stats(&settings).unwrap();
    }

    #[test]
    fn test_dry_run_leaves_store_untouched() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        let event_path = temp.path().join("event.json");
        fs::write(
            &event_path,
            r#"{"eventType": "appealReceived", "new": {"caseId": "ABC123",
                "events": [{"type": "appealReceived", "date": "2018-01-01T09:00:00Z"}]}}"#,
        )
        .unwrap();

        process_event_file(&settings, &event_path, true).unwrap();
        let storage = open_storage(&settings).unwrap();
        assert_eq!(storage.get_stats().unwrap().job_count, 0);
    }

    #[test]
    fn test_invalid_event_file() {
        let temp = TempDir::new().unwrap();
        let event_path = temp.path().join("event.json");
        fs::write(&event_path, "{not json").unwrap();
        assert!(process_event_file(&settings(&temp), &event_path, false).is_err());
    }
}
