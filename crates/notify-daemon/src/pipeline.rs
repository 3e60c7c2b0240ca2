//! Wiring of the engine components around one job store.

use std::sync::Arc;

use notify_reminders::{ReminderError, ReminderOutcome, ReminderPayload, ReminderService};
use notify_router::{NotificationDecision, NotificationRouter};
use notify_scheduler::{
    JobDispatcher, JobExecutor, JobRemover, JobScheduler, RetryPolicy, SchedulerError,
    SerializerRegistry,
};
use notify_storage::JobStore;
use notify_types::{CaseEvent, EventType, Settings};
use serde::Serialize;
use tracing::info;

/// Result of processing one inbound case event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    /// Notifications to send now
    pub notifications: Vec<NotificationDecision>,
    /// Reminder jobs scheduled and cancelled
    pub reminders: ReminderOutcome,
}

/// Router, reminder service and job plumbing sharing one store.
pub struct Engine {
    store: Arc<dyn JobStore>,
    scheduler: JobScheduler,
    remover: JobRemover,
    router: NotificationRouter,
    reminders: ReminderService,
    retry_policy: RetryPolicy,
}

impl Engine {
    /// Build the engine from settings.
    ///
    /// # Errors
    ///
    /// Returns `ReminderError::Config` if the reminder settings are unusable.
    pub fn new(settings: &Settings, store: Arc<dyn JobStore>) -> Result<Self, ReminderError> {
        let serializers = Arc::new(SerializerRegistry::new().with_json::<ReminderPayload>());
        let scheduler = JobScheduler::new(store.clone(), serializers);
        let remover = JobRemover::new(store.clone());
        let reminders =
            ReminderService::from_settings(&settings.reminders, scheduler.clone(), remover.clone())?;

        Ok(Self {
            store,
            scheduler,
            remover,
            router: NotificationRouter::new(),
            reminders,
            retry_policy: RetryPolicy::from_settings(&settings.retry),
        })
    }

    /// Route the event and apply its reminder changes.
    ///
    /// # Errors
    ///
    /// Returns the reminder service's error if the job store faults.
    pub fn process(&self, event: &CaseEvent) -> Result<ProcessReport, ReminderError> {
        let notifications = self.route(event);
        let reminders = self.reminders.process(event)?;
        info!(
            case_id = %event.case_id(),
            event = %event.event_type,
            notifications = notifications.len(),
            scheduled = reminders.scheduled.len(),
            removed_groups = reminders.removed_groups.len(),
            "Case event processed"
        );
        Ok(ProcessReport {
            notifications,
            reminders,
        })
    }

    /// Route the event without touching reminder jobs.
    pub fn route(&self, event: &CaseEvent) -> Vec<NotificationDecision> {
        self.router.route(event)
    }

    /// A dispatcher with `executor` bound to every reminder job name.
    ///
    /// # Errors
    ///
    /// Fails only if a reminder name is bound twice.
    pub fn dispatcher(
        &self,
        executor: Arc<dyn JobExecutor<ReminderPayload>>,
    ) -> Result<JobDispatcher, SchedulerError> {
        let mut dispatcher = JobDispatcher::new(self.scheduler.clone(), self.retry_policy);
        for reminder in EventType::ALL.into_iter().filter(EventType::is_reminder) {
            dispatcher.bind::<ReminderPayload>(reminder.id(), executor.clone())?;
        }
        Ok(dispatcher)
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub fn remover(&self) -> &JobRemover {
        &self.remover
    }
}
