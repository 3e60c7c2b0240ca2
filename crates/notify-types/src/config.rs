//! Configuration loading for the case notification engine.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/case-notify/config.toml.
//! Settings are immutable once loaded.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::NotifyError;

/// Delays and offsets used by the reminder handlers, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSettings {
    /// Delay after "appeal received" before chasing a late DWP response.
    #[serde(default = "default_dwp_response_late_delay")]
    pub dwp_response_late_delay_secs: u64,

    /// Delay after "DWP response received" before the evidence reminder.
    #[serde(default = "default_evidence_delay")]
    pub evidence_delay_secs: u64,

    /// Delay after "DWP response received" before the first holding reminder.
    #[serde(default = "default_holding_delay")]
    pub first_holding_delay_secs: u64,

    /// Delay after the first holding reminder before the second.
    #[serde(default = "default_holding_delay")]
    pub second_holding_delay_secs: u64,

    /// Delay after the second holding reminder before the third.
    #[serde(default = "default_holding_delay")]
    pub third_holding_delay_secs: u64,

    /// Delay after the third holding reminder before the final one.
    #[serde(default = "default_final_holding_delay")]
    pub final_holding_delay_secs: u64,

    /// How long before the hearing the first hearing reminder fires.
    #[serde(default = "default_first_hearing_offset")]
    pub first_hearing_offset_secs: u64,

    /// How long before the hearing the second hearing reminder fires.
    #[serde(default = "default_second_hearing_offset")]
    pub second_hearing_offset_secs: u64,

    /// IANA time zone hearing dates and times are recorded in.
    #[serde(default = "default_hearing_timezone")]
    pub hearing_timezone: String,
}

fn default_dwp_response_late_delay() -> u64 {
    35 * 24 * 60 * 60
}

fn default_evidence_delay() -> u64 {
    2 * 24 * 60 * 60
}

fn default_holding_delay() -> u64 {
    6 * 7 * 24 * 60 * 60
}

fn default_final_holding_delay() -> u64 {
    4 * 7 * 24 * 60 * 60
}

fn default_first_hearing_offset() -> u64 {
    2 * 24 * 60 * 60
}

fn default_second_hearing_offset() -> u64 {
    4 * 24 * 60 * 60
}

fn default_hearing_timezone() -> String {
    "Europe/London".to_string()
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            dwp_response_late_delay_secs: default_dwp_response_late_delay(),
            evidence_delay_secs: default_evidence_delay(),
            first_holding_delay_secs: default_holding_delay(),
            second_holding_delay_secs: default_holding_delay(),
            third_holding_delay_secs: default_holding_delay(),
            final_holding_delay_secs: default_final_holding_delay(),
            first_hearing_offset_secs: default_first_hearing_offset(),
            second_hearing_offset_secs: default_second_hearing_offset(),
            hearing_timezone: default_hearing_timezone(),
        }
    }
}

impl ReminderSettings {
    /// Holding reminder delays, one per chain stage, in firing order.
    pub fn holding_delays_secs(&self) -> [u64; 4] {
        [
            self.first_holding_delay_secs,
            self.second_holding_delay_secs,
            self.third_holding_delay_secs,
            self.final_holding_delay_secs,
        ]
    }

    /// Parse the hearing time zone.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::InvalidTimezone` if the string is not a valid
    /// IANA identifier.
    pub fn parse_hearing_timezone(&self) -> Result<chrono_tz::Tz, NotifyError> {
        self.hearing_timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| NotifyError::InvalidTimezone(self.hearing_timezone.clone()))
    }

    /// Validate configuration values.
    ///
    /// Holding reminder delays must be positive so the chain fires at
    /// strictly increasing times.
    pub fn validate(&self) -> Result<(), String> {
        if self.holding_delays_secs().contains(&0) {
            return Err("holding reminder delays must be > 0".to_string());
        }
        if self.first_hearing_offset_secs == self.second_hearing_offset_secs {
            return Err("hearing reminder offsets must differ".to_string());
        }
        if self.parse_hearing_timezone().is_err() {
            return Err(format!("invalid hearing_timezone: {}", self.hearing_timezone));
        }
        Ok(())
    }
}

/// Retry behaviour for reminder jobs that fail at due time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Attempt count at which a failing job is dropped.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay before a failed job runs again.
    #[serde(default = "default_backoff")]
    pub backoff_secs: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff() -> u64 {
    300
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_secs: default_backoff(),
        }
    }
}

/// Settings for the background dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Timezone the dispatch cron expression is evaluated in.
    #[serde(default = "default_scheduler_timezone")]
    pub default_timezone: String,

    /// Cron expression (6-field) for the due-job dispatch tick.
    #[serde(default = "default_dispatch_cron")]
    pub dispatch_cron: String,

    /// Timeout in seconds for graceful shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

fn default_scheduler_timezone() -> String {
    "UTC".to_string()
}

fn default_dispatch_cron() -> String {
    "*/30 * * * * *".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            default_timezone: default_scheduler_timezone(),
            dispatch_cron: default_dispatch_cron(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl SchedulerSettings {
    /// Parse the configured timezone string into a `chrono_tz::Tz`.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::InvalidTimezone` if the timezone string
    /// is not a valid IANA timezone identifier.
    pub fn parse_timezone(&self) -> Result<chrono_tz::Tz, NotifyError> {
        self.default_timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| NotifyError::InvalidTimezone(self.default_timezone.clone()))
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the RocksDB job store directory
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Reminder delays and offsets
    #[serde(default)]
    pub reminders: ReminderSettings,

    /// Retry policy for due jobs
    #[serde(default)]
    pub retry: RetrySettings,

    /// Dispatch loop settings
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", "case-notify")
        .map(|p| p.data_local_dir().join("jobs"))
        .unwrap_or_else(|| PathBuf::from("./jobs"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            reminders: ReminderSettings::default(),
            retry: RetrySettings::default(),
            scheduler: SchedulerSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/case-notify/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (NOTIFY_*, nested keys joined with `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, NotifyError> {
        let config_dir = ProjectDirs::from("", "", "case-notify")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())
            .map_err(|e| NotifyError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| NotifyError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: NOTIFY_DB_PATH, NOTIFY_RETRY__MAX_ATTEMPTS, NOTIFY_REMINDERS__EVIDENCE_DELAY_SECS
        builder = builder.add_source(
            Environment::with_prefix("NOTIFY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| NotifyError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| NotifyError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate the loaded settings.
    pub fn validate(&self) -> Result<(), NotifyError> {
        self.reminders.validate().map_err(NotifyError::Config)?;
        self.scheduler.parse_timezone()?;
        Ok(())
    }

    /// Expand ~ in db_path to the actual home directory
    pub fn expanded_db_path(&self) -> PathBuf {
        if let Some(rest) = self.db_path.strip_prefix("~/") {
            if let Some(base) = directories::BaseDirs::new() {
                return base.home_dir().join(rest);
            }
        }
        PathBuf::from(&self.db_path)
    }
}
