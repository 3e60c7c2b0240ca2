//! Notification routing E2E tests, driven by wire-format case events.

use pretty_assertions::assert_eq;
use serde_json::json;

use e2e_tests::TestHarness;
use notify_router::{NotificationDecision, NotificationType};
use notify_types::{CaseEvent, Channel, EventType, Party};

fn subscription_update() -> CaseEvent {
    serde_json::from_value(json!({
        "eventType": "subscriptionUpdated",
        "old": {
            "caseId": "ABC123",
            "events": [
                {"type": "appealReceived", "date": "2017-09-01T10:00:00Z"}
            ],
            "subscriptions": {
                "appellant": {"emailSubscribed": true, "email": "old@example.com", "token": "app"}
            }
        },
        "new": {
            "caseId": "ABC123",
            "events": [
                {"type": "evidenceReminder", "date": "2017-10-03T10:00:00Z"},
                {"type": "appealReceived", "date": "2017-09-01T10:00:00Z"},
                {"type": "dwpResponseReceived", "date": "2017-10-01T10:00:00Z"}
            ],
            "subscriptions": {
                "appellant": {
                    "emailSubscribed": true,
                    "email": "new@example.com",
                    "smsSubscribed": true,
                    "mobile": "07700900123",
                    "token": "app"
                },
                "representative": {"emailSubscribed": true, "email": "rep@example.com", "token": "rep"}
            }
        }
    }))
    .expect("valid case event")
}

#[test]
fn test_subscription_update_routes_change_notifications() {
    let harness = TestHarness::new();
    let report = harness.engine.process(&subscription_update()).unwrap();

    let resend = NotificationType::Event(EventType::DwpResponseReceived);
    assert_eq!(
        report.notifications,
        vec![
            NotificationDecision::new(
                Party::Appellant,
                Channel::Email,
                NotificationType::SubscriptionOld,
                "old@example.com"
            ),
            NotificationDecision::new(
                Party::Appellant,
                Channel::Email,
                NotificationType::SubscriptionUpdated,
                "new@example.com"
            ),
            NotificationDecision::new(
                Party::Appellant,
                Channel::Sms,
                NotificationType::SubscriptionCreated,
                "07700900123"
            ),
            NotificationDecision::new(Party::Appellant, Channel::Sms, resend, "07700900123"),
            NotificationDecision::new(
                Party::Representative,
                Channel::Email,
                NotificationType::SubscriptionCreated,
                "rep@example.com"
            ),
            NotificationDecision::new(Party::Representative, Channel::Email, resend, "rep@example.com"),
        ]
    );
    // Subscription changes never touch reminder jobs.
    assert!(report.reminders.scheduled.is_empty());
    assert!(harness.all_jobs().is_empty());
}

#[test]
fn test_routing_is_deterministic() {
    let harness = TestHarness::new();
    let event = subscription_update();
    let first = harness.engine.route(&event);
    for _ in 0..10 {
        assert_eq!(harness.engine.route(&event), first);
    }
}

#[test]
fn test_hearing_booked_reaches_other_parties() {
    let harness = TestHarness::new();
    let event: CaseEvent = serde_json::from_value(json!({
        "eventType": "hearingBooked",
        "new": {
            "caseId": "ABC123",
            "subscriptions": {
                "appellant": {"smsSubscribed": true, "mobile": "07700900123", "token": "app"},
                "otherParties": [
                    {"id": "op1", "subscription": {"emailSubscribed": true, "email": "op1@example.com", "token": "op1"}}
                ]
            },
            "hearings": [
                {"date": "2018-01-01", "time": "14:01:18", "venue": "Fox Court"}
            ]
        }
    }))
    .unwrap();

    let report = harness.engine.process(&event).unwrap();
    let parties: Vec<Party> = report.notifications.iter().map(|d| d.party.clone()).collect();
    assert_eq!(
        parties,
        vec![Party::Appellant, Party::OtherParty("op1".to_string())]
    );
    assert_eq!(report.reminders.scheduled.len(), 2);
}

#[test]
fn test_appointee_receives_instead_of_appellant() {
    let harness = TestHarness::new();
    let event: CaseEvent = serde_json::from_value(json!({
        "eventType": "appealReceived",
        "new": {
            "caseId": "ABC123",
            "events": [{"type": "appealReceived", "date": "2017-09-01T10:00:00Z"}],
            "subscriptions": {
                "appellant": {"emailSubscribed": true, "email": "app@example.com", "token": "app"},
                "appointee": {"emailSubscribed": true, "email": "apt@example.com", "token": "apt"}
            }
        }
    }))
    .unwrap();

    let decisions = harness.engine.route(&event);
    assert_eq!(
        decisions,
        vec![NotificationDecision::new(
            Party::Appointee,
            Channel::Email,
            NotificationType::Event(EventType::AppealReceived),
            "apt@example.com"
        )]
    );
}
