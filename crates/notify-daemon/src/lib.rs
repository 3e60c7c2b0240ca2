//! Notification daemon library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (start, process, jobs, cancel, stats)
//! - `executor`: Executor for due reminder jobs
//! - `pipeline`: Engine wiring router, reminders and the job store

pub mod cli;
pub mod commands;
pub mod executor;
pub mod pipeline;

pub use cli::{Cli, Commands};
pub use commands::{cancel_group, list_jobs, process_event_file, show_stats, start_daemon};
pub use executor::ReminderNotifier;
pub use pipeline::{Engine, ProcessReport};
