//! Concurrent event processing against one shared job store.

use std::sync::Arc;

use e2e_tests::{ts, TestHarness};
use notify_types::{CaseEvent, CaseSnapshot, EventType};

#[tokio::test]
async fn test_concurrent_cases_keep_groups_separate() {
    let harness = Arc::new(TestHarness::new());

    let mut handles = Vec::new();
    for i in 0..8 {
        let harness = harness.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let case_id = format!("CASE{}", i);
            let snapshot = CaseSnapshot::new(case_id.as_str())
                .with_event(EventType::AppealReceived, ts("2017-09-01T10:00:00Z"))
                .with_event(EventType::DwpResponseReceived, ts("2017-10-01T10:00:00Z"));
            harness
                .engine
                .process(&CaseEvent::new(EventType::DwpResponseReceived, None, snapshot.clone()))
                .unwrap();
            if i % 2 == 0 {
                let withdrawn =
                    snapshot.with_event(EventType::AppealWithdrawn, ts("2017-10-02T10:00:00Z"));
                harness
                    .engine
                    .process(&CaseEvent::new(EventType::AppealWithdrawn, None, withdrawn))
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for i in 0..8 {
        let expected = if i % 2 == 0 { 0 } else { 1 };
        assert_eq!(
            harness.group(&format!("CASE{}_evidenceReminder", i)).len(),
            expected
        );
        assert_eq!(
            harness.group(&format!("CASE{}_finalHearingHoldingReminder", i)).len(),
            expected
        );
    }
    // Four surviving cases, each with evidence plus four holding reminders
    assert_eq!(harness.all_jobs().len(), 4 * 5);
}
