use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use serde_json::json;
use uuid::Uuid;

use savora_auth_schema::outbox_events;

use crate::domain::repository::Mailer;
use crate::error::AuthServiceError;

/// Mailer adapter that enqueues outbox rows instead of talking SMTP.
/// An external relay drains `outbox_events`, renders the template named by
/// the event kind and delivers to the recipient; this service only records
/// intent.
#[derive(Clone)]
pub struct OutboxMailer {
    pub db: DatabaseConnection,
}

impl OutboxMailer {
    async fn enqueue(
        &self,
        kind: &str,
        recipient: &str,
        payload: serde_json::Value,
    ) -> Result<(), AuthServiceError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        outbox_events::ActiveModel {
            id: Set(id),
            kind: Set(kind.to_owned()),
            recipient: Set(recipient.to_owned()),
            payload: Set(payload),
            idempotency_key: Set(format!("{}:{}", kind, id)),
            attempts: Set(0),
            last_error: Set(None),
            created_at: Set(now),
            next_attempt_at: Set(now),
            processed_at: Set(None),
            failed_at: Set(None),
        }
        .insert(&self.db)
        .await
        .context("enqueue outbox event")?;
        Ok(())
    }
}

impl Mailer for OutboxMailer {
    async fn send_signup_code(&self, email: &str, code: &str) -> Result<(), AuthServiceError> {
        self.enqueue("signup_code_email", email, json!({ "code": code }))
            .await
    }

    async fn send_recovery_code(&self, email: &str, code: &str) -> Result<(), AuthServiceError> {
        self.enqueue("recovery_code_email", email, json!({ "code": code }))
            .await
    }

    async fn send_welcome(
        &self,
        email: &str,
        first_name: &str,
    ) -> Result<(), AuthServiceError> {
        self.enqueue("welcome_email", email, json!({ "first_name": first_name }))
            .await
    }

    async fn send_password_changed(&self, email: &str) -> Result<(), AuthServiceError> {
        self.enqueue("password_changed_email", email, json!({}))
            .await
    }
}
