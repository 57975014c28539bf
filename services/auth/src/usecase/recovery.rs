use serde_json::json;

use savora_domain::audit::AuditAction;

use crate::domain::repository::{AuditLogRepository, CodeRepository, Mailer, UserRepository};
use crate::domain::types::{AuditEvent, CodePurpose, RequestContext, UserPatch};
use crate::error::AuthServiceError;
use crate::usecase::audit::AuditRecorder;
use crate::usecase::code::{GenerateCodeUseCase, VerifyCodeUseCase};
use crate::usecase::notify::Notifier;
use crate::usecase::password::encrypt_password;

// ── RecoveryInit ─────────────────────────────────────────────────────────────

pub struct RecoveryInitUseCase<U, C, M, A>
where
    U: UserRepository,
    C: CodeRepository,
    M: Mailer,
    A: AuditLogRepository,
{
    pub users: U,
    pub codes: GenerateCodeUseCase<C>,
    pub mailer: M,
    pub audit: AuditRecorder<A>,
}

impl<U, C, M, A> RecoveryInitUseCase<U, C, M, A>
where
    U: UserRepository,
    C: CodeRepository,
    M: Mailer,
    A: AuditLogRepository,
{
    /// Responds uniformly whether or not the username exists — an unknown
    /// name is audited and swallowed, so callers cannot enumerate accounts.
    pub async fn execute(
        &self,
        username: &str,
        ctx: &RequestContext,
    ) -> Result<(), AuthServiceError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            self.audit
                .record(
                    AuditEvent::failure(AuditAction::RecoveryInit, None, ctx, "user not found")
                        .with_metadata(json!({ "username": username })),
                )
                .await;
            return Ok(());
        };

        let code = self.codes.execute(username, CodePurpose::Recovery).await?;

        if let Err(e) = self.mailer.send_recovery_code(&user.email, &code.code).await {
            self.audit
                .record(AuditEvent::failure(
                    AuditAction::RecoveryInit,
                    Some(user.id),
                    ctx,
                    e.to_string(),
                ))
                .await;
            return Err(e);
        }

        self.audit
            .record(AuditEvent::success(
                AuditAction::RecoveryInit,
                Some(user.id),
                ctx,
            ))
            .await;
        Ok(())
    }
}

// ── RecoveryConfirm ──────────────────────────────────────────────────────────

pub struct RecoveryConfirmInput {
    pub username: String,
    pub code: String,
    pub new_password: String,
}

pub struct RecoveryConfirmUseCase<U, C, M, A>
where
    U: UserRepository,
    C: CodeRepository,
    M: Mailer + 'static,
    A: AuditLogRepository,
{
    pub users: U,
    pub codes: VerifyCodeUseCase<C>,
    pub notifier: Notifier<M>,
    pub audit: AuditRecorder<A>,
    pub password_secret: String,
}

impl<U, C, M, A> RecoveryConfirmUseCase<U, C, M, A>
where
    U: UserRepository,
    C: CodeRepository,
    M: Mailer + 'static,
    A: AuditLogRepository,
{
    /// Bad code and unknown user both surface as `InvalidCode`; recovery
    /// issues no token pair — the user signs in with the new password.
    pub async fn execute(
        &self,
        input: RecoveryConfirmInput,
        ctx: &RequestContext,
    ) -> Result<(), AuthServiceError> {
        if !self
            .codes
            .execute(&input.username, &input.code, CodePurpose::Recovery)
            .await?
        {
            self.audit
                .record(
                    AuditEvent::failure(
                        AuditAction::RecoveryConfirmFailed,
                        None,
                        ctx,
                        "invalid or expired code",
                    )
                    .with_metadata(json!({ "username": input.username })),
                )
                .await;
            return Err(AuthServiceError::InvalidCode);
        }

        let Some(user) = self.users.find_by_username(&input.username).await? else {
            self.audit
                .record(
                    AuditEvent::failure(
                        AuditAction::RecoveryConfirmFailed,
                        None,
                        ctx,
                        "user not found",
                    )
                    .with_metadata(json!({ "username": input.username })),
                )
                .await;
            return Err(AuthServiceError::InvalidCode);
        };

        let patch = UserPatch {
            password_hash: Some(encrypt_password(&input.new_password, &self.password_secret)),
            ..Default::default()
        };
        if let Err(e) = self.users.update(user.id, &patch).await {
            self.audit
                .record(AuditEvent::failure(
                    AuditAction::RecoveryConfirmFailed,
                    Some(user.id),
                    ctx,
                    e.to_string(),
                ))
                .await;
            return Err(e);
        }

        self.notifier.dispatch_password_changed(&user.email);
        self.audit
            .record(AuditEvent::success(
                AuditAction::RecoveryConfirmSuccess,
                Some(user.id),
                ctx,
            ))
            .await;
        Ok(())
    }
}
