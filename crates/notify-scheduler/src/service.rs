//! Scheduler service wrapper around tokio-cron-scheduler.
//!
//! Drives the periodic dispatch pass and any other cron jobs the daemon
//! registers, with graceful shutdown support.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use notify_types::SchedulerSettings;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler as CronScheduler};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::dispatcher::JobDispatcher;
use crate::SchedulerError;

/// Validate a cron expression.
///
/// The expression uses the 6-field format:
/// second minute hour day-of-month month day-of-week.
///
/// # Errors
///
/// Returns `SchedulerError::InvalidCron` if the expression is not valid.
///
/// # Example
///
/// ```
/// use notify_scheduler::validate_cron_expression;
///
/// assert!(validate_cron_expression("*/30 * * * * *").is_ok());
/// assert!(validate_cron_expression("0 30 4 * * *").is_ok());
///
/// assert!(validate_cron_expression("invalid").is_err());
/// assert!(validate_cron_expression("").is_err());
/// ```
pub fn validate_cron_expression(expr: &str) -> Result<(), SchedulerError> {
    match CronJob::new_async(expr, |_uuid, _lock| Box::pin(async {})) {
        Ok(_) => Ok(()),
        Err(e) => Err(SchedulerError::InvalidCron(format!("'{}': {}", expr, e))),
    }
}

/// Service wrapper around the cron scheduler for lifecycle management.
pub struct SchedulerService {
    scheduler: CronScheduler,
    settings: SchedulerSettings,
    shutdown_token: CancellationToken,
    in_flight: TaskTracker,
    is_running: AtomicBool,
}

impl SchedulerService {
    /// Create a new scheduler service. Call `start()` to begin running jobs.
    pub async fn new(settings: SchedulerSettings) -> Result<Self, SchedulerError> {
        Self::parse_timezone(&settings.default_timezone)?;
        validate_cron_expression(&settings.dispatch_cron)?;

        let scheduler = CronScheduler::new().await?;

        Ok(Self {
            scheduler,
            settings,
            shutdown_token: CancellationToken::new(),
            in_flight: TaskTracker::new(),
            is_running: AtomicBool::new(false),
        })
    }

    /// Start the scheduler.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::AlreadyRunning` if the scheduler is already started.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        if self.is_running.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.scheduler.start().await?;
        info!("Scheduler started");

        Ok(())
    }

    /// Shutdown the scheduler gracefully.
    ///
    /// Cancels the shutdown token, waits up to `shutdown_timeout_secs` for
    /// running jobs to finish, then stops the scheduler.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::NotRunning` if the scheduler is not started.
    pub async fn shutdown(&mut self) -> Result<(), SchedulerError> {
        if !self.is_running.load(Ordering::SeqCst) {
            return Err(SchedulerError::NotRunning);
        }

        info!("Initiating scheduler shutdown");
        self.shutdown_token.cancel();

        self.in_flight.close();
        let timeout = std::time::Duration::from_secs(self.settings.shutdown_timeout_secs);
        if tokio::time::timeout(timeout, self.in_flight.wait()).await.is_err() {
            warn!(
                in_flight = self.in_flight.len(),
                timeout_secs = self.settings.shutdown_timeout_secs,
                "Jobs still running at shutdown timeout"
            );
        }

        if let Err(e) = self.scheduler.shutdown().await {
            warn!("Error during scheduler shutdown: {}", e);
        }

        self.is_running.store(false, Ordering::SeqCst);
        info!("Scheduler shutdown complete");

        Ok(())
    }

    /// Token cancelled on shutdown. Jobs should exit cleanly once it fires.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Check if the scheduler is currently running.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Get the scheduler settings.
    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Add a cron job with timezone-aware scheduling.
    ///
    /// `timezone` falls back to the configured default. The job receives a
    /// clone of the shutdown token.
    ///
    /// # Errors
    ///
    /// Returns an error if the cron expression is invalid or the timezone is
    /// not recognized.
    pub async fn add_cron_job<F, Fut>(
        &self,
        name: &str,
        cron_expr: &str,
        timezone: Option<&str>,
        job_fn: F,
    ) -> Result<uuid::Uuid, SchedulerError>
    where
        F: Fn(CancellationToken) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let tz = Self::parse_timezone(timezone.unwrap_or(&self.settings.default_timezone))?;
        validate_cron_expression(cron_expr)?;

        let job_name = name.to_string();
        let shutdown_token = self.shutdown_token.clone();
        let in_flight = self.in_flight.clone();

        let job = CronJob::new_async_tz(cron_expr, tz, move |_uuid, _lock| {
            let name = job_name.clone();
            let token = shutdown_token.clone();
            let job_fn = job_fn.clone();
            let tracked = in_flight.token();

            Box::pin(async move {
                let _tracked = tracked;
                let start = std::time::Instant::now();
                job_fn(token).await;
                debug!(job = %name, duration_ms = start.elapsed().as_millis(), "Cron job completed");
            })
        })
        .map_err(|e| SchedulerError::InvalidCron(e.to_string()))?;

        let uuid = self.scheduler.add(job).await?;
        info!(job = %name, uuid = %uuid, cron = %cron_expr, timezone = %tz.name(), "Cron job registered");

        Ok(uuid)
    }

    /// Run `dispatcher` on the configured dispatch cron.
    ///
    /// Each tick dispatches everything due at the tick time. Ticks after
    /// shutdown has begun are skipped.
    pub async fn register_dispatcher(
        &self,
        dispatcher: Arc<JobDispatcher>,
    ) -> Result<uuid::Uuid, SchedulerError> {
        let cron = self.settings.dispatch_cron.clone();
        self.add_cron_job("dispatch-due-jobs", &cron, None, move |token| {
            let dispatcher = dispatcher.clone();
            async move {
                if token.is_cancelled() {
                    info!("Dispatch skipped - shutdown in progress");
                    return;
                }
                if let Err(e) = dispatcher.dispatch_due(Utc::now()).await {
                    error!(error = %e, "Dispatch pass failed");
                }
            }
        })
        .await
    }

    /// Parse an IANA timezone name.
    pub fn parse_timezone(tz_str: &str) -> Result<Tz, SchedulerError> {
        tz_str
            .parse()
            .map_err(|_| SchedulerError::InvalidTimezone(tz_str.to_string()))
    }
}
