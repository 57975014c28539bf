use serde_json::json;

use savora_domain::audit::AuditAction;

use crate::domain::repository::{AuditLogRepository, TokenRepository, UserRepository};
use crate::domain::types::{AuditEvent, RequestContext, TokenPair, User};
use crate::error::AuthServiceError;
use crate::usecase::audit::AuditRecorder;
use crate::usecase::password::verify_password;
use crate::usecase::token::TokenIssuer;

pub struct SignInInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct SignInOutput {
    pub user: User,
    pub tokens: TokenPair,
}

pub struct SignInUseCase<U, T, A>
where
    U: UserRepository,
    T: TokenRepository,
    A: AuditLogRepository,
{
    pub users: U,
    pub tokens: T,
    pub audit: AuditRecorder<A>,
    pub issuer: TokenIssuer,
    pub password_secret: String,
}

impl<U, T, A> SignInUseCase<U, T, A>
where
    U: UserRepository,
    T: TokenRepository,
    A: AuditLogRepository,
{
    /// Callers see a generic `Unauthorized` whether the username is unknown
    /// or the password is wrong; the audit row carries the actual reason.
    pub async fn execute(
        &self,
        input: SignInInput,
        ctx: &RequestContext,
    ) -> Result<SignInOutput, AuthServiceError> {
        let Some(user) = self.users.find_by_username(&input.username).await? else {
            self.audit
                .record(
                    AuditEvent::failure(AuditAction::SignInFailed, None, ctx, "user not found")
                        .with_metadata(json!({ "username": input.username })),
                )
                .await;
            return Err(AuthServiceError::Unauthorized);
        };

        // A stale cache entry can still serve a soft-deleted record.
        if user.is_deleted() {
            self.audit
                .record(AuditEvent::failure(
                    AuditAction::SignInFailed,
                    Some(user.id),
                    ctx,
                    "user deleted",
                ))
                .await;
            return Err(AuthServiceError::EntityDeleted);
        }

        if !user.is_active {
            self.audit
                .record(AuditEvent::failure(
                    AuditAction::SignInFailed,
                    Some(user.id),
                    ctx,
                    "user deactivated",
                ))
                .await;
            return Err(AuthServiceError::Unauthorized);
        }

        if !verify_password(&input.password, &user.password_hash, &self.password_secret) {
            self.audit
                .record(AuditEvent::failure(
                    AuditAction::SignInFailed,
                    Some(user.id),
                    ctx,
                    "invalid password",
                ))
                .await;
            return Err(AuthServiceError::Unauthorized);
        }

        let tokens = match self.issuer.issue_pair(&user, &self.tokens).await {
            Ok(pair) => pair,
            Err(e) => {
                self.audit
                    .record(AuditEvent::failure(
                        AuditAction::SignInFailed,
                        Some(user.id),
                        ctx,
                        e.to_string(),
                    ))
                    .await;
                return Err(e);
            }
        };

        self.audit
            .record(AuditEvent::success(
                AuditAction::SignInSuccess,
                Some(user.id),
                ctx,
            ))
            .await;

        Ok(SignInOutput { user, tokens })
    }
}
