//! Executor for due reminder jobs.
//!
//! Delivery through channel senders happens outside this process, so the
//! daemon's executor records the due reminder and hands it off via logs.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use notify_reminders::ReminderPayload;
use notify_scheduler::{ExecutionError, JobExecutor};
use tracing::info;

/// Logs every due reminder.
#[derive(Debug, Default)]
pub struct ReminderNotifier {
    delivered: AtomicU64,
}

impl ReminderNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reminders handed off since start.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl JobExecutor<ReminderPayload> for ReminderNotifier {
    async fn execute(&self, payload: ReminderPayload) -> Result<(), ExecutionError> {
        info!(case_id = %payload.case_id, reminder = %payload.event_type, "Reminder due");
        self.delivered.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify_types::EventType;

    #[tokio::test]
    async fn test_notifier_counts_reminders() {
        let notifier = ReminderNotifier::new();
        notifier
            .execute(ReminderPayload::new("ABC123", EventType::HearingReminder))
            .await
            .unwrap();
        assert_eq!(notifier.delivered(), 1);
    }
}
