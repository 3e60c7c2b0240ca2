//! Case Notification Daemon
//!
//! Routes case events to immediate notifications and runs scheduled
//! reminder jobs.
//!
//! # Usage
//!
//! ```bash
//! notify-daemon start [--db-path PATH]
//! notify-daemon process event.json [--dry-run]
//! notify-daemon jobs ABC123_hearingReminder
//! notify-daemon cancel ABC123_hearingReminder
//! notify-daemon stats
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/case-notify/config.toml)
//! 3. Environment variables (NOTIFY_*)
//! 4. CLI flags

use std::path::Path;

use anyhow::Result;
use clap::Parser;

use notify_daemon::commands::{init_logging, load_settings};
use notify_daemon::{
    cancel_group, list_jobs, process_event_file, show_stats, start_daemon, Cli, Commands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(
        cli.config.as_deref(),
        cli.db_path.as_deref(),
        cli.log_level.as_deref(),
    )?;
    init_logging(&settings.log_level)?;

    match cli.command {
        Commands::Start => {
            start_daemon(settings).await?;
        }
        Commands::Process { file, dry_run } => {
            process_event_file(&settings, Path::new(&file), dry_run)?;
        }
        Commands::Jobs { group } => {
            list_jobs(&settings, &group)?;
        }
        Commands::Cancel { group } => {
            cancel_group(&settings, &group)?;
        }
        Commands::Stats => {
            show_stats(&settings)?;
        }
    }

    Ok(())
}
