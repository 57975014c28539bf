use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::repository::Mailer;

/// Fire-and-forget notification dispatch.
///
/// Each call spawns a task; delivery failures are logged and never reach the
/// caller, so a slow or failing mail transport cannot delay or fail an
/// authentication response. The handle is returned so tests can await
/// completion; production callers drop it.
pub struct Notifier<M: Mailer + 'static> {
    mailer: Arc<M>,
}

impl<M: Mailer + 'static> Clone for Notifier<M> {
    fn clone(&self) -> Self {
        Self {
            mailer: Arc::clone(&self.mailer),
        }
    }
}

impl<M: Mailer + 'static> Notifier<M> {
    pub fn new(mailer: M) -> Self {
        Self {
            mailer: Arc::new(mailer),
        }
    }

    pub fn dispatch_welcome(&self, email: &str, first_name: &str) -> JoinHandle<()> {
        let mailer = Arc::clone(&self.mailer);
        let email = email.to_owned();
        let first_name = first_name.to_owned();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_welcome(&email, &first_name).await {
                tracing::warn!(error = %e, "welcome email dispatch failed");
            }
        })
    }

    pub fn dispatch_password_changed(&self, email: &str) -> JoinHandle<()> {
        let mailer = Arc::clone(&self.mailer);
        let email = email.to_owned();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_password_changed(&email).await {
                tracing::warn!(error = %e, "password-changed email dispatch failed");
            }
        })
    }
}
