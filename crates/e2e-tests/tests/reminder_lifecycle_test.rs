//! Reminder lifecycle E2E tests.
//!
//! Walks a case through appeal received, DWP response, hearing booked and
//! postponement, checking which reminder groups exist after each step and
//! that due reminders reach the executor.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use pretty_assertions::assert_eq;

use e2e_tests::{ts, RecordingExecutor, TestHarness};
use notify_reminders::ReminderPayload;
use notify_types::{CaseSnapshot, EventType, Hearing, ReminderSettings, Settings};

const HOLDING_GROUPS: [&str; 4] = [
    "ABC123_firstHearingHoldingReminder",
    "ABC123_secondHearingHoldingReminder",
    "ABC123_thirdHearingHoldingReminder",
    "ABC123_finalHearingHoldingReminder",
];

fn hearing() -> Hearing {
    Hearing {
        date: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
        time: NaiveTime::from_hms_opt(14, 1, 18).unwrap(),
        venue: "Fox Court".to_string(),
    }
}

#[test]
fn test_case_lifecycle_schedules_and_cancels_groups() {
    let harness = TestHarness::new();

    // 1. Appeal received: late-response reminder only
    let snapshot = CaseSnapshot::new("ABC123")
        .with_event(EventType::AppealReceived, ts("2017-09-01T10:00:00Z"));
    harness.process(EventType::AppealReceived, &snapshot);
    assert_eq!(harness.group("ABC123_dwpResponseLateReminder").len(), 1);
    assert_eq!(harness.all_jobs().len(), 1);

    // 2. DWP response: late reminder cancelled; evidence and holding chain scheduled
    let snapshot = snapshot.with_event(EventType::DwpResponseReceived, ts("2017-10-01T10:00:00Z"));
    harness.process(EventType::DwpResponseReceived, &snapshot);
    assert!(harness.group("ABC123_dwpResponseLateReminder").is_empty());
    assert_eq!(harness.group("ABC123_evidenceReminder").len(), 1);
    let mut previous = None;
    for group in HOLDING_GROUPS {
        let jobs = harness.group(group);
        assert_eq!(jobs.len(), 1, "{}", group);
        if let Some(previous) = previous {
            assert!(jobs[0].trigger_at > previous, "{} not after previous stage", group);
        }
        previous = Some(jobs[0].trigger_at);
    }

    // 3. Hearing booked: holding chain and evidence cancelled; two hearing reminders
    let snapshot = snapshot
        .with_event(EventType::HearingBooked, ts("2017-11-01T10:00:00Z"))
        .with_hearing(hearing());
    harness.process(EventType::HearingBooked, &snapshot);
    for group in HOLDING_GROUPS {
        assert!(harness.group(group).is_empty(), "{} should be cancelled", group);
    }
    assert!(harness.group("ABC123_evidenceReminder").is_empty());
    let hearing_jobs = harness.group("ABC123_hearingReminder");
    assert_eq!(
        hearing_jobs.iter().map(|j| j.trigger_at).collect::<Vec<_>>(),
        vec![ts("2017-12-28T14:01:18Z"), ts("2017-12-30T14:01:18Z")]
    );

    // 4. Postponement: hearing reminders cancelled, nothing left
    let snapshot = snapshot.with_event(EventType::Postponement, ts("2017-12-01T10:00:00Z"));
    harness.process(EventType::Postponement, &snapshot);
    assert!(harness.all_jobs().is_empty());
}

#[test]
fn test_hearing_reminder_scenario_with_configured_offsets() {
    let harness = TestHarness::with_settings(Settings {
        reminders: ReminderSettings {
            first_hearing_offset_secs: 172_800,
            second_hearing_offset_secs: 345_600,
            hearing_timezone: "Europe/London".to_string(),
            ..Default::default()
        },
        ..Default::default()
    });

    let snapshot = CaseSnapshot::new("ABC123").with_hearing(hearing());
    harness.process(EventType::HearingBooked, &snapshot);

    let jobs = harness.group("ABC123_hearingReminder");
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].trigger_at, ts("2017-12-28T14:01:18Z"));
    assert_eq!(jobs[1].trigger_at, ts("2017-12-30T14:01:18Z"));
}

#[tokio::test]
async fn test_due_reminders_reach_executor_once() {
    let harness = TestHarness::new();
    let snapshot = CaseSnapshot::new("ABC123")
        .with_event(EventType::AppealReceived, ts("2017-09-01T10:00:00Z"))
        .with_event(EventType::DwpResponseReceived, ts("2017-10-01T10:00:00Z"));
    harness.process(EventType::DwpResponseReceived, &snapshot);

    let executor = Arc::new(RecordingExecutor::default());
    let dispatcher = harness.engine.dispatcher(executor.clone()).unwrap();

    // Evidence reminder is due two days after the response; the first
    // holding reminder six weeks after.
    let summary = dispatcher.dispatch_due(ts("2017-10-04T00:00:00Z")).await.unwrap();
    assert_eq!(summary.succeeded, 1);
    assert_eq!(
        executor.seen(),
        vec![ReminderPayload::new("ABC123", EventType::EvidenceReminder)]
    );

    // Nothing runs twice.
    let summary = dispatcher.dispatch_due(ts("2017-10-04T00:00:00Z")).await.unwrap();
    assert_eq!(summary.total(), 0);

    let summary = dispatcher.dispatch_due(ts("2017-11-13T00:00:00Z")).await.unwrap();
    assert_eq!(summary.succeeded, 1);
    assert_eq!(
        executor.seen().last(),
        Some(&ReminderPayload::new("ABC123", EventType::FirstHearingHoldingReminder))
    );
    assert_eq!(harness.all_jobs().len(), 3);
}

#[test]
fn test_cancelled_reminders_never_fire() {
    let harness = TestHarness::new();
    let snapshot = CaseSnapshot::new("ABC123")
        .with_event(EventType::AppealReceived, ts("2017-09-01T10:00:00Z"));
    harness.process(EventType::AppealReceived, &snapshot);
    harness.process(
        EventType::AppealWithdrawn,
        &snapshot.with_event(EventType::AppealWithdrawn, ts("2017-09-02T10:00:00Z")),
    );
    assert!(harness.all_jobs().is_empty());
}
