use serde_json::json;

use savora_domain::audit::AuditAction;
use savora_domain::user::RoleTag;

use crate::domain::repository::{
    AuditLogRepository, CodeRepository, Mailer, TokenRepository, UserRepository,
};
use crate::domain::types::{
    AuditEvent, CodePurpose, NewProfile, NewUser, RequestContext, TokenPair, User,
};
use crate::error::AuthServiceError;
use crate::usecase::audit::AuditRecorder;
use crate::usecase::code::{GenerateCodeUseCase, VerifyCodeUseCase};
use crate::usecase::notify::Notifier;
use crate::usecase::password::encrypt_password;
use crate::usecase::token::TokenIssuer;

// ── SignUpInit ───────────────────────────────────────────────────────────────

pub struct SignUpInitUseCase<U, C, M, A>
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

impl<U, C, M, A> SignUpInitUseCase<U, C, M, A>
where
    U: UserRepository,
    C: CodeRepository,
    M: Mailer,
    A: AuditLogRepository,
{
    pub async fn execute(
        &self,
        email: &str,
        ctx: &RequestContext,
    ) -> Result<(), AuthServiceError> {
        if self.users.find_by_email(email).await?.is_some() {
            self.audit
                .record(
                    AuditEvent::failure(AuditAction::SignUpInit, None, ctx, "email already exists")
                        .with_metadata(json!({ "email": email })),
                )
                .await;
            return Err(AuthServiceError::EmailAlreadyExists);
        }

        // Signup codes are keyed by the email — no username exists yet.
        let code = self.codes.execute(email, CodePurpose::Signup).await?;

        if let Err(e) = self.mailer.send_signup_code(email, &code.code).await {
            self.audit
                .record(
                    AuditEvent::failure(AuditAction::SignUpInit, None, ctx, e.to_string())
                        .with_metadata(json!({ "email": email })),
                )
                .await;
            return Err(e);
        }

        self.audit
            .record(
                AuditEvent::success(AuditAction::SignUpInit, None, ctx)
                    .with_metadata(json!({ "email": email })),
            )
            .await;
        Ok(())
    }
}

// ── SignUp ───────────────────────────────────────────────────────────────────

pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub code: String,
}

#[derive(Debug)]
pub struct SignUpOutput {
    pub user: User,
    pub tokens: TokenPair,
}

pub struct SignUpUseCase<U, C, T, M, A>
where
    U: UserRepository,
    C: CodeRepository,
    T: TokenRepository,
    M: Mailer + 'static,
    A: AuditLogRepository,
{
    pub users: U,
    pub codes: VerifyCodeUseCase<C>,
    pub tokens: T,
    pub notifier: Notifier<M>,
    pub audit: AuditRecorder<A>,
    pub issuer: TokenIssuer,
    pub password_secret: String,
}

impl<U, C, T, M, A> SignUpUseCase<U, C, T, M, A>
where
    U: UserRepository,
    C: CodeRepository,
    T: TokenRepository,
    M: Mailer + 'static,
    A: AuditLogRepository,
{
    pub async fn execute(
        &self,
        input: SignUpInput,
        ctx: &RequestContext,
    ) -> Result<SignUpOutput, AuthServiceError> {
        if !self
            .codes
            .execute(&input.email, &input.code, CodePurpose::Signup)
            .await?
        {
            self.audit
                .record(
                    AuditEvent::failure(
                        AuditAction::SignUpFailed,
                        None,
                        ctx,
                        "invalid or expired code",
                    )
                    .with_metadata(json!({ "email": input.email })),
                )
                .await;
            return Err(AuthServiceError::InvalidCode);
        }

        // Re-checked here: the email may have been taken between init and now.
        if self.users.find_by_email(&input.email).await?.is_some() {
            self.audit
                .record(
                    AuditEvent::failure(
                        AuditAction::SignUpFailed,
                        None,
                        ctx,
                        "email already exists",
                    )
                    .with_metadata(json!({ "email": input.email })),
                )
                .await;
            return Err(AuthServiceError::EmailAlreadyExists);
        }

        let new_user = NewUser {
            first_name: input.first_name,
            last_name: input.last_name,
            // Accounts sign in by username; registration defaults it to the email.
            username: input.email.clone(),
            email: input.email.clone(),
            password_hash: encrypt_password(&input.password, &self.password_secret),
            is_super: false,
            roles: vec![RoleTag::Member],
        };

        let user = match self.users.create(&new_user, &NewProfile::default()).await {
            Ok(user) => user,
            Err(e) => {
                self.audit
                    .record(
                        AuditEvent::failure(AuditAction::SignUpFailed, None, ctx, e.to_string())
                            .with_metadata(json!({ "email": input.email })),
                    )
                    .await;
                return Err(e);
            }
        };

        let tokens = match self.issuer.issue_pair(&user, &self.tokens).await {
            Ok(pair) => pair,
            Err(e) => {
                self.audit
                    .record(AuditEvent::failure(
                        AuditAction::SignUpFailed,
                        Some(user.id),
                        ctx,
                        e.to_string(),
                    ))
                    .await;
                return Err(e);
            }
        };

        self.notifier.dispatch_welcome(&user.email, &user.first_name);
        self.audit
            .record(
                AuditEvent::success(AuditAction::SignUpSuccess, Some(user.id), ctx)
                    .with_metadata(json!({ "email": user.email })),
            )
            .await;

        Ok(SignUpOutput { user, tokens })
    }
}
