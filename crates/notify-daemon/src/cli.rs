//! CLI argument parsing for the notification daemon.
//!
//! CLI flags override every other configuration source.

use clap::{Parser, Subcommand};

/// Case Notification Daemon
///
/// Routes case events to notifications and runs scheduled reminders.
#[derive(Parser, Debug)]
#[command(name = "notify-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides the default config location)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override database path
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the reminder dispatcher until interrupted
    Start,

    /// Process a case event read from a JSON file
    Process {
        /// Path to the case event JSON
        file: String,

        /// Only print the routing decisions; leave reminder jobs untouched
        #[arg(long)]
        dry_run: bool,
    },

    /// List the jobs in a job group
    Jobs {
        /// Job group, e.g. ABC123_hearingReminder
        group: String,
    },

    /// Cancel every job in a job group
    Cancel {
        /// Job group, e.g. ABC123_hearingReminder
        group: String,
    },

    /// Show job store statistics
    Stats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_start() {
        let cli = Cli::parse_from(["notify-daemon", "start"]);
        assert!(matches!(cli.command, Commands::Start));
    }

    #[test]
    fn test_cli_global_db_path() {
        let cli = Cli::parse_from(["notify-daemon", "start", "--db-path", "/custom/db"]);
        assert_eq!(cli.db_path, Some("/custom/db".to_string()));
    }

    #[test]
    fn test_cli_with_config_and_log_level() {
        let cli = Cli::parse_from([
            "notify-daemon",
            "--config",
            "/path/to/config.toml",
            "--log-level",
            "debug",
            "stats",
        ]);
        assert_eq!(cli.config, Some("/path/to/config.toml".to_string()));
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Stats));
    }

    #[test]
    fn test_cli_process() {
        let cli = Cli::parse_from(["notify-daemon", "process", "event.json", "--dry-run"]);
        match cli.command {
            Commands::Process { file, dry_run } => {
                assert_eq!(file, "event.json");
                assert!(dry_run);
            }
            _ => panic!("Expected Process command"),
        }
    }

    #[test]
    fn test_cli_jobs_and_cancel() {
        let cli = Cli::parse_from(["notify-daemon", "jobs", "ABC123_hearingReminder"]);
        match cli.command {
            Commands::Jobs { group } => assert_eq!(group, "ABC123_hearingReminder"),
            _ => panic!("Expected Jobs command"),
        }

        let cli = Cli::parse_from(["notify-daemon", "cancel", "ABC123_evidenceReminder"]);
        match cli.command {
            Commands::Cancel { group } => assert_eq!(group, "ABC123_evidenceReminder"),
            _ => panic!("Expected Cancel command"),
        }
    }

    #[test]
    fn test_cli_requires_group() {
        assert!(Cli::try_parse_from(["notify-daemon", "cancel"]).is_err());
    }
}
