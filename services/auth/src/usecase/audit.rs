use crate::domain::repository::AuditLogRepository;
use crate::domain::types::AuditEvent;

/// Best-effort audit sink.
///
/// `record` never fails: an audit write error must not abort the user-facing
/// operation it describes, so persistence errors are traced and dropped.
pub struct AuditRecorder<A: AuditLogRepository> {
    pub repo: A,
}

impl<A: AuditLogRepository> AuditRecorder<A> {
    pub async fn record(&self, event: AuditEvent) {
        if let Err(e) = self.repo.append(&event).await {
            tracing::warn!(
                error = %e,
                action = event.action.as_str(),
                "audit log write failed"
            );
        }
    }
}
