use savora_auth::usecase::audit::AuditRecorder;
use savora_auth::usecase::notify::Notifier;
use savora_auth::domain::types::AuditEvent;
use savora_domain::audit::AuditAction;

use crate::helpers::{FailingAuditLog, MockMailer, RecordingAuditLog, SentMail, test_ctx};

#[tokio::test]
async fn should_swallow_audit_store_failures() {
    let recorder = AuditRecorder {
        repo: FailingAuditLog,
    };

    // Completes without error despite the failing store.
    recorder
        .record(AuditEvent::success(
            AuditAction::SignInSuccess,
            Some(1),
            &test_ctx(),
        ))
        .await;
}

#[tokio::test]
async fn should_record_failure_events_with_reason() {
    let log = RecordingAuditLog::empty();
    let recorder = AuditRecorder { repo: log.clone() };

    recorder
        .record(
            AuditEvent::failure(AuditAction::SignInFailed, None, &test_ctx(), "user not found")
                .with_metadata(serde_json::json!({ "username": "ghost" })),
        )
        .await;

    let row = log.find(AuditAction::SignInFailed).unwrap();
    assert!(!row.success);
    assert_eq!(row.error_message.as_deref(), Some("user not found"));
    assert_eq!(row.metadata.unwrap()["username"], "ghost");
    assert_eq!(row.context.ip, "198.51.100.7");
}

#[tokio::test]
async fn should_deliver_notifications_out_of_band() {
    let mailer = MockMailer::working();
    let notifier = Notifier::new(mailer.clone());

    notifier
        .dispatch_welcome("carol@example.com", "Carol")
        .await
        .unwrap();
    notifier
        .dispatch_password_changed("carol@example.com")
        .await
        .unwrap();

    let sent = mailer.sent.lock().unwrap();
    assert!(sent.contains(&SentMail::Welcome {
        email: "carol@example.com".to_owned()
    }));
    assert!(sent.contains(&SentMail::PasswordChanged {
        email: "carol@example.com".to_owned()
    }));
}

#[tokio::test]
async fn should_swallow_notification_failures() {
    let mailer = MockMailer::failing();
    let notifier = Notifier::new(mailer.clone());

    // The spawned task logs the failure and finishes cleanly.
    notifier
        .dispatch_welcome("carol@example.com", "Carol")
        .await
        .unwrap();

    assert_eq!(mailer.sent_count(), 0);
}
