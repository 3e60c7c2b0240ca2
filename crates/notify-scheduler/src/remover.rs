//! Job remover: cancels jobs by id or by group.

use std::sync::Arc;

use notify_storage::{JobStore, StorageError};
use tracing::info;

use crate::SchedulerError;

/// Cancels scheduled jobs.
///
/// Group removal is all-or-nothing: every job sharing the group is deleted
/// in a single store operation.
#[derive(Clone)]
pub struct JobRemover {
    store: Arc<dyn JobStore>,
}

impl JobRemover {
    /// Create a remover over `store`.
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Remove one job.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::JobNotFound` if no job with this id exists in
    /// `group`, or `SchedulerError::RemovalFailed` on a store fault.
    pub fn remove(&self, id: &str, group: &str) -> Result<(), SchedulerError> {
        let not_found = || SchedulerError::JobNotFound(format!("{} in group {}", id, group));

        let record = match self.store.get(id) {
            Ok(Some(record)) => record,
            Ok(None) | Err(StorageError::Key(_)) => return Err(not_found()),
            Err(e) => return Err(SchedulerError::RemovalFailed(e.to_string())),
        };
        if record.group != group {
            return Err(not_found());
        }

        let deleted = self
            .store
            .delete_by_id(id)
            .map_err(|e| SchedulerError::RemovalFailed(e.to_string()))?;
        if !deleted {
            return Err(not_found());
        }

        info!(job_id = %id, group = %group, "Job removed");
        Ok(())
    }

    /// Remove every job in `group`, returning the removed ids.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::GroupNotFound` if the group is empty, or
    /// `SchedulerError::RemovalFailed` on a store fault.
    pub fn remove_group(&self, group: &str) -> Result<Vec<String>, SchedulerError> {
        let removed = self
            .store
            .delete_by_group(group)
            .map_err(|e| SchedulerError::RemovalFailed(format!("{}: {}", group, e)))?;

        if removed.is_empty() {
            return Err(SchedulerError::GroupNotFound(group.to_string()));
        }

        info!(group = %group, count = removed.len(), "Job group removed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{open_store, FailingStore};
    use chrono::Utc;
    use notify_storage::JobRecord;

    fn put(store: &Arc<dyn JobStore>, group: &str) -> String {
        let record = JobRecord::new(group, "hearingReminder", Vec::new(), Utc::now());
        store.put(&record).unwrap();
        record.id
    }

    #[test]
    fn test_remove_by_id() {
        let (store, _temp) = open_store();
        let id = put(&store, "ABC123_hearingReminder");
        let remover = JobRemover::new(store.clone());

        remover.remove(&id, "ABC123_hearingReminder").unwrap();
        assert!(store.get(&id).unwrap().is_none());

        let again = remover.remove(&id, "ABC123_hearingReminder");
        assert!(matches!(again, Err(SchedulerError::JobNotFound(_))));
    }

    #[test]
    fn test_remove_wrong_group_is_not_found() {
        let (store, _temp) = open_store();
        let id = put(&store, "ABC123_hearingReminder");
        let remover = JobRemover::new(store.clone());

        let result = remover.remove(&id, "ABC123_evidenceReminder");
        assert!(matches!(result, Err(SchedulerError::JobNotFound(_))));
        assert!(store.get(&id).unwrap().is_some());
    }

    #[test]
    fn test_remove_unknown_id_is_not_found() {
        let (store, _temp) = open_store();
        let remover = JobRemover::new(store);
        let result = remover.remove("no-such-job", "ABC123_hearingReminder");
        assert!(matches!(result, Err(SchedulerError::JobNotFound(_))));
    }

    #[test]
    fn test_remove_group_removes_all_members() {
        let (store, _temp) = open_store();
        for _ in 0..3 {
            put(&store, "ABC123_hearingReminder");
        }
        put(&store, "ABC123_evidenceReminder");
        let remover = JobRemover::new(store.clone());

        let removed = remover.remove_group("ABC123_hearingReminder").unwrap();
        assert_eq!(removed.len(), 3);
        assert!(store.list_by_group("ABC123_hearingReminder").unwrap().is_empty());
        assert_eq!(store.list_by_group("ABC123_evidenceReminder").unwrap().len(), 1);
    }

    #[test]
    fn test_remove_empty_group_is_not_found() {
        let (store, _temp) = open_store();
        let remover = JobRemover::new(store);
        let result = remover.remove_group("ABC123_hearingReminder");
        assert!(matches!(result, Err(SchedulerError::GroupNotFound(group)) if group == "ABC123_hearingReminder"));
    }

    #[test]
    fn test_store_fault_is_removal_failure() {
        let remover = JobRemover::new(Arc::new(FailingStore));
        assert!(matches!(
            remover.remove_group("ABC123_hearingReminder"),
            Err(SchedulerError::RemovalFailed(_))
        ));
        assert!(matches!(
            remover.remove("01HN4QXKN6YWXVKZ3JMHP4BCDE", "ABC123_hearingReminder"),
            Err(SchedulerError::RemovalFailed(_))
        ));
    }
}
