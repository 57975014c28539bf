#![allow(async_fn_in_trait)]

use rand::RngExt;
use serde_json::json;

use savora_domain::audit::AuditAction;
use savora_domain::user::RoleTag;

use crate::domain::repository::{
    AuditLogRepository, IdTokenVerifier, Mailer, TokenRepository, UserRepository,
};
use crate::domain::types::{
    AuditEvent, ExternalIdentity, NewProfile, NewUser, OauthPayload, ProviderKind,
    RequestContext, TokenPair, User,
};
use crate::error::AuthServiceError;
use crate::usecase::audit::AuditRecorder;
use crate::usecase::notify::Notifier;
use crate::usecase::password::encrypt_password;
use crate::usecase::token::TokenIssuer;

#[derive(Debug)]
pub struct OauthLoginOutput {
    pub user: User,
    pub tokens: TokenPair,
}

/// Capability set implemented once per federated identity provider.
pub trait OauthStrategy {
    fn provider(&self) -> ProviderKind;

    /// Verify the external token, resolve or provision the local account,
    /// and issue a token pair.
    async fn execute(
        &self,
        payload: &OauthPayload,
        ctx: &RequestContext,
    ) -> Result<OauthLoginOutput, AuthServiceError>;

    /// Provision a local account for a first-seen federated identity.
    /// Providers opt into self-registration by overriding; the default
    /// refuses.
    async fn register(
        &self,
        _identity: &ExternalIdentity,
        _ctx: &RequestContext,
    ) -> Result<User, AuthServiceError> {
        Err(AuthServiceError::Forbidden)
    }
}

/// Maps provider tags to registered strategies, resolved once at startup.
/// Unregistered providers are `Forbidden`.
pub struct OauthRegistry<G: OauthStrategy> {
    google: Option<G>,
}

impl<G: OauthStrategy> OauthRegistry<G> {
    pub fn new(google: Option<G>) -> Self {
        Self { google }
    }

    pub async fn login(
        &self,
        payload: &OauthPayload,
        ctx: &RequestContext,
    ) -> Result<OauthLoginOutput, AuthServiceError> {
        match payload.provider {
            ProviderKind::Google => match &self.google {
                Some(strategy) => strategy.execute(payload, ctx).await,
                None => Err(AuthServiceError::Forbidden),
            },
            // No Apple strategy ships yet.
            ProviderKind::Apple => Err(AuthServiceError::Forbidden),
        }
    }
}

// ── Google ───────────────────────────────────────────────────────────────────

/// Charset for the unusable random password given to provisioned accounts.
const PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn random_password() -> String {
    let mut rng = rand::rng();
    (0..32)
        .map(|_| PASSWORD_CHARSET[rng.random_range(0..PASSWORD_CHARSET.len())] as char)
        .collect()
}

pub struct GoogleStrategy<V, U, T, M, A>
where
    V: IdTokenVerifier,
    U: UserRepository,
    T: TokenRepository,
    M: Mailer + 'static,
    A: AuditLogRepository,
{
    pub verifier: V,
    pub users: U,
    pub tokens: T,
    pub notifier: Notifier<M>,
    pub audit: AuditRecorder<A>,
    pub issuer: TokenIssuer,
    pub password_secret: String,
}

impl<V, U, T, M, A> OauthStrategy for GoogleStrategy<V, U, T, M, A>
where
    V: IdTokenVerifier,
    U: UserRepository,
    T: TokenRepository,
    M: Mailer + 'static,
    A: AuditLogRepository,
{
    fn provider(&self) -> ProviderKind {
        ProviderKind::Google
    }

    /// Every failure path below audits exactly once — verification errors
    /// here, provisioning errors inside `register` — before surfacing as
    /// the generic caller-visible class.
    async fn execute(
        &self,
        payload: &OauthPayload,
        ctx: &RequestContext,
    ) -> Result<OauthLoginOutput, AuthServiceError> {
        let identity = match self.verifier.verify(&payload.id_token).await {
            Ok(identity) => identity,
            Err(e) => {
                self.audit
                    .record(
                        AuditEvent::failure(AuditAction::OauthLoginFailed, None, ctx, e.to_string())
                            .with_metadata(json!({ "provider": self.provider().as_str() })),
                    )
                    .await;
                return Err(AuthServiceError::Unauthorized);
            }
        };

        let user = match self.users.find_by_email(&identity.email).await? {
            Some(user) => user,
            // register audits its own outcome; do not log again here.
            None => self.register(&identity, ctx).await?,
        };

        let tokens = match self.issuer.issue_pair(&user, &self.tokens).await {
            Ok(pair) => pair,
            Err(e) => {
                self.audit
                    .record(AuditEvent::failure(
                        AuditAction::OauthLoginFailed,
                        Some(user.id),
                        ctx,
                        e.to_string(),
                    ))
                    .await;
                return Err(e);
            }
        };

        self.audit
            .record(
                AuditEvent::success(AuditAction::OauthLoginSuccess, Some(user.id), ctx)
                    .with_metadata(json!({
                        "provider": self.provider().as_str(),
                        "email": user.email,
                    })),
            )
            .await;

        Ok(OauthLoginOutput { user, tokens })
    }

    async fn register(
        &self,
        identity: &ExternalIdentity,
        ctx: &RequestContext,
    ) -> Result<User, AuthServiceError> {
        let new_user = NewUser {
            first_name: identity.given_name.clone().unwrap_or_default(),
            last_name: identity.family_name.clone().unwrap_or_default(),
            username: identity.email.clone(),
            email: identity.email.clone(),
            // The account has no usable password until the user recovers one.
            password_hash: encrypt_password(&random_password(), &self.password_secret),
            is_super: false,
            roles: vec![RoleTag::Member],
        };

        let user = match self.users.create(&new_user, &NewProfile::default()).await {
            Ok(user) => user,
            Err(e) => {
                self.audit
                    .record(
                        AuditEvent::failure(
                            AuditAction::OauthRegistrationFailed,
                            None,
                            ctx,
                            e.to_string(),
                        )
                        .with_metadata(json!({ "email": identity.email })),
                    )
                    .await;
                return Err(e);
            }
        };

        self.notifier.dispatch_welcome(&user.email, &user.first_name);
        self.audit
            .record(
                AuditEvent::success(AuditAction::OauthRegistrationSuccess, Some(user.id), ctx)
                    .with_metadata(json!({
                        "provider": self.provider().as_str(),
                        "email": user.email,
                    })),
            )
            .await;

        Ok(user)
    }
}
