use savora_auth::domain::types::{
    ExternalIdentity, OauthPayload, ProviderKind, RequestContext,
};
use savora_auth::error::AuthServiceError;
use savora_auth::usecase::audit::AuditRecorder;
use savora_auth::usecase::notify::Notifier;
use savora_auth::usecase::oauth::{
    GoogleStrategy, OauthLoginOutput, OauthRegistry, OauthStrategy,
};
use savora_auth_types::token::validate_access_token;
use savora_domain::audit::AuditAction;

use crate::helpers::{
    MockMailer, MockTokenRepo, MockUserRepo, MockVerifier, RecordingAuditLog, TEST_JWT_SECRET,
    TEST_PASSWORD_SECRET, test_ctx, test_issuer, test_user,
};

type TestGoogleStrategy =
    GoogleStrategy<MockVerifier, MockUserRepo, MockTokenRepo, MockMailer, RecordingAuditLog>;

fn google(
    verifier: MockVerifier,
    users: MockUserRepo,
    audit: RecordingAuditLog,
) -> TestGoogleStrategy {
    GoogleStrategy {
        verifier,
        users,
        tokens: MockTokenRepo::empty(),
        notifier: Notifier::new(MockMailer::working()),
        audit: AuditRecorder { repo: audit },
        issuer: test_issuer(),
        password_secret: TEST_PASSWORD_SECRET.to_owned(),
    }
}

fn payload(provider: ProviderKind) -> OauthPayload {
    OauthPayload {
        provider,
        id_token: "external-id-token".to_owned(),
    }
}

#[tokio::test]
async fn should_provision_account_on_first_seen_email() {
    let users = MockUserRepo::empty();
    let audit = RecordingAuditLog::empty();
    let registry = OauthRegistry::new(Some(google(
        MockVerifier::accepting("new@example.com"),
        users.clone(),
        audit.clone(),
    )));

    let out = registry
        .login(&payload(ProviderKind::Google), &test_ctx())
        .await
        .unwrap();

    // Exactly one user row and one profile row.
    assert_eq!(users.user_count(), 1);
    assert_eq!(users.profile_count(), 1);
    assert_eq!(out.user.email, "new@example.com");
    assert_eq!(out.user.first_name, "Carol");
    assert!(!out.user.is_super);

    let info = validate_access_token(&out.tokens.access_token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, out.user.id);

    // One registration-success and one login-success entry, nothing else.
    assert_eq!(audit.count(AuditAction::OauthRegistrationSuccess), 1);
    assert_eq!(audit.count(AuditAction::OauthLoginSuccess), 1);
    assert_eq!(audit.total(), 2);
}

#[tokio::test]
async fn should_only_log_login_for_known_email() {
    let users = MockUserRepo::empty();
    let audit = RecordingAuditLog::empty();
    let registry = OauthRegistry::new(Some(google(
        MockVerifier::accepting("new@example.com"),
        users.clone(),
        audit.clone(),
    )));

    registry
        .login(&payload(ProviderKind::Google), &test_ctx())
        .await
        .unwrap();
    registry
        .login(&payload(ProviderKind::Google), &test_ctx())
        .await
        .unwrap();

    // Second login reuses the account: no new rows, no second registration.
    assert_eq!(users.user_count(), 1);
    assert_eq!(audit.count(AuditAction::OauthRegistrationSuccess), 1);
    assert_eq!(audit.count(AuditAction::OauthLoginSuccess), 2);
}

#[tokio::test]
async fn should_authenticate_existing_local_account_by_email() {
    let existing = test_user(9, "carol", "carol@example.com", "password123");
    let users = MockUserRepo::new(vec![existing]);
    let audit = RecordingAuditLog::empty();
    let registry = OauthRegistry::new(Some(google(
        MockVerifier::accepting("carol@example.com"),
        users.clone(),
        audit.clone(),
    )));

    let out = registry
        .login(&payload(ProviderKind::Google), &test_ctx())
        .await
        .unwrap();

    assert_eq!(out.user.id, 9);
    assert_eq!(users.user_count(), 1);
    assert_eq!(audit.count(AuditAction::OauthRegistrationSuccess), 0);
}

#[tokio::test]
async fn should_audit_verification_failure_exactly_once() {
    let audit = RecordingAuditLog::empty();
    let registry = OauthRegistry::new(Some(google(
        MockVerifier::rejecting(),
        MockUserRepo::empty(),
        audit.clone(),
    )));

    let result = registry
        .login(&payload(ProviderKind::Google), &test_ctx())
        .await;

    assert!(matches!(result, Err(AuthServiceError::Unauthorized)));
    assert_eq!(audit.count(AuditAction::OauthLoginFailed), 1);
    assert_eq!(audit.total(), 1);
}

#[tokio::test]
async fn should_refuse_provider_without_registered_strategy() {
    let audit = RecordingAuditLog::empty();
    let registry = OauthRegistry::new(Some(google(
        MockVerifier::accepting("new@example.com"),
        MockUserRepo::empty(),
        audit.clone(),
    )));

    let result = registry
        .login(&payload(ProviderKind::Apple), &test_ctx())
        .await;

    assert!(matches!(result, Err(AuthServiceError::Forbidden)));
    assert_eq!(audit.total(), 0);
}

#[tokio::test]
async fn should_refuse_google_when_not_registered() {
    let registry: OauthRegistry<TestGoogleStrategy> = OauthRegistry::new(None);

    let result = registry
        .login(&payload(ProviderKind::Google), &test_ctx())
        .await;

    assert!(matches!(result, Err(AuthServiceError::Forbidden)));
}

// Strategy relying on the trait's default `register` body.
struct NoRegistrationStrategy;

impl OauthStrategy for NoRegistrationStrategy {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn execute(
        &self,
        _payload: &OauthPayload,
        ctx: &RequestContext,
    ) -> Result<OauthLoginOutput, AuthServiceError> {
        let identity = ExternalIdentity {
            subject: "subject".to_owned(),
            email: "new@example.com".to_owned(),
            given_name: None,
            family_name: None,
        };
        let _user = self.register(&identity, ctx).await?;
        unreachable!("default register never succeeds");
    }
}

#[tokio::test]
async fn should_refuse_registration_by_default() {
    let registry = OauthRegistry::new(Some(NoRegistrationStrategy));

    let result = registry
        .login(&payload(ProviderKind::Google), &test_ctx())
        .await;

    assert!(matches!(result, Err(AuthServiceError::Forbidden)));
}
