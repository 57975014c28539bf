use chrono::Utc;

use savora_auth::error::AuthServiceError;
use savora_auth::infra::cached::CachedUserRepository;
use savora_auth::usecase::audit::AuditRecorder;
use savora_auth::usecase::signin::{SignInInput, SignInUseCase};
use savora_auth_types::token::validate_access_token;
use savora_domain::audit::AuditAction;

use crate::helpers::{
    InMemoryUserCache, MockTokenRepo, MockUserRepo, RecordingAuditLog, TEST_JWT_SECRET,
    TEST_PASSWORD_SECRET, test_ctx, test_issuer, test_user,
};

fn usecase(
    users: MockUserRepo,
    tokens: MockTokenRepo,
    audit: RecordingAuditLog,
) -> SignInUseCase<MockUserRepo, MockTokenRepo, RecordingAuditLog> {
    SignInUseCase {
        users,
        tokens,
        audit: AuditRecorder { repo: audit },
        issuer: test_issuer(),
        password_secret: TEST_PASSWORD_SECRET.to_owned(),
    }
}

fn input(username: &str, password: &str) -> SignInInput {
    SignInInput {
        username: username.to_owned(),
        password: password.to_owned(),
    }
}

#[tokio::test]
async fn should_issue_token_pair_on_valid_credentials() {
    let user = test_user(3, "carol", "carol@example.com", "password123");
    let tokens = MockTokenRepo::empty();
    let audit = RecordingAuditLog::empty();
    let usecase = usecase(MockUserRepo::new(vec![user]), tokens.clone(), audit.clone());

    let out = usecase
        .execute(input("carol", "password123"), &test_ctx())
        .await
        .unwrap();

    assert_eq!(out.user.id, 3);
    let info = validate_access_token(&out.tokens.access_token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, 3);
    assert!(!info.is_super);
    assert_eq!(tokens.row_count(), 1);
    assert_eq!(audit.count(AuditAction::SignInSuccess), 1);
}

#[tokio::test]
async fn should_reject_unknown_username_with_generic_error() {
    let audit = RecordingAuditLog::empty();
    let usecase = usecase(MockUserRepo::empty(), MockTokenRepo::empty(), audit.clone());

    let result = usecase
        .execute(input("nouser", "whatever123"), &test_ctx())
        .await;

    assert!(matches!(result, Err(AuthServiceError::Unauthorized)));
    // Exactly one failure row; the audit trail names the reason the caller
    // never sees.
    assert_eq!(audit.count(AuditAction::SignInFailed), 1);
    let row = audit.find(AuditAction::SignInFailed).unwrap();
    assert!(!row.success);
    assert!(row.error_message.as_deref().unwrap().contains("user not found"));
    assert_eq!(row.user_id, None);
}

#[tokio::test]
async fn should_reject_wrong_password_with_generic_error() {
    let user = test_user(3, "carol", "carol@example.com", "password123");
    let audit = RecordingAuditLog::empty();
    let usecase = usecase(
        MockUserRepo::new(vec![user]),
        MockTokenRepo::empty(),
        audit.clone(),
    );

    let result = usecase
        .execute(input("carol", "password124"), &test_ctx())
        .await;

    assert!(matches!(result, Err(AuthServiceError::Unauthorized)));
    let row = audit.find(AuditAction::SignInFailed).unwrap();
    assert_eq!(row.error_message.as_deref(), Some("invalid password"));
    assert_eq!(row.user_id, Some(3));
}

#[tokio::test]
async fn should_reject_deactivated_user() {
    let mut user = test_user(3, "carol", "carol@example.com", "password123");
    user.is_active = false;
    let audit = RecordingAuditLog::empty();
    let usecase = usecase(
        MockUserRepo::new(vec![user]),
        MockTokenRepo::empty(),
        audit.clone(),
    );

    let result = usecase
        .execute(input("carol", "password123"), &test_ctx())
        .await;

    assert!(matches!(result, Err(AuthServiceError::Unauthorized)));
    let row = audit.find(AuditAction::SignInFailed).unwrap();
    assert_eq!(row.error_message.as_deref(), Some("user deactivated"));
}

#[tokio::test]
async fn should_reject_soft_deleted_user_served_from_stale_cache() {
    // The store no longer resolves the username, but a stale cache entry
    // still serves the soft-deleted record.
    let mut stale = test_user(3, "carol", "carol@example.com", "password123");
    stale.deleted_at = Some(Utc::now());
    let cache = InMemoryUserCache::empty();
    cache.seed(&stale);

    let cached_repo = CachedUserRepository {
        store: MockUserRepo::empty(),
        cache,
    };
    let audit = RecordingAuditLog::empty();
    let usecase = SignInUseCase {
        users: cached_repo,
        tokens: MockTokenRepo::empty(),
        audit: AuditRecorder {
            repo: audit.clone(),
        },
        issuer: test_issuer(),
        password_secret: TEST_PASSWORD_SECRET.to_owned(),
    };

    let result = usecase
        .execute(input("carol", "password123"), &test_ctx())
        .await;

    assert!(matches!(result, Err(AuthServiceError::EntityDeleted)));
    let row = audit.find(AuditAction::SignInFailed).unwrap();
    assert_eq!(row.error_message.as_deref(), Some("user deleted"));
}
