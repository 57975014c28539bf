use savora_auth::domain::types::CodePurpose;
use savora_auth::error::AuthServiceError;
use savora_auth::usecase::audit::AuditRecorder;
use savora_auth::usecase::code::{GenerateCodeUseCase, VerifyCodeUseCase};
use savora_auth::usecase::notify::Notifier;
use savora_auth::usecase::password::verify_password;
use savora_auth::usecase::recovery::{
    RecoveryConfirmInput, RecoveryConfirmUseCase, RecoveryInitUseCase,
};
use savora_domain::audit::AuditAction;

use crate::helpers::{
    MockCodeRepo, MockMailer, MockUserRepo, RecordingAuditLog, SentMail, TEST_PASSWORD_SECRET,
    test_ctx, test_user,
};

struct Fixture {
    users: MockUserRepo,
    codes: MockCodeRepo,
    mailer: MockMailer,
    audit: RecordingAuditLog,
}

impl Fixture {
    fn new(users: MockUserRepo) -> Self {
        Self {
            users,
            codes: MockCodeRepo::empty(),
            mailer: MockMailer::working(),
            audit: RecordingAuditLog::empty(),
        }
    }

    fn init_usecase(
        &self,
    ) -> RecoveryInitUseCase<MockUserRepo, MockCodeRepo, MockMailer, RecordingAuditLog> {
        RecoveryInitUseCase {
            users: self.users.clone(),
            codes: GenerateCodeUseCase {
                codes: self.codes.clone(),
                code_length: 5,
            },
            mailer: self.mailer.clone(),
            audit: AuditRecorder {
                repo: self.audit.clone(),
            },
        }
    }

    fn confirm_usecase(
        &self,
    ) -> RecoveryConfirmUseCase<MockUserRepo, MockCodeRepo, MockMailer, RecordingAuditLog> {
        RecoveryConfirmUseCase {
            users: self.users.clone(),
            codes: VerifyCodeUseCase {
                codes: self.codes.clone(),
            },
            notifier: Notifier::new(self.mailer.clone()),
            audit: AuditRecorder {
                repo: self.audit.clone(),
            },
            password_secret: TEST_PASSWORD_SECRET.to_owned(),
        }
    }

    fn confirm_input(&self, username: &str, code: &str, new_password: &str) -> RecoveryConfirmInput {
        RecoveryConfirmInput {
            username: username.to_owned(),
            code: code.to_owned(),
            new_password: new_password.to_owned(),
        }
    }
}

#[tokio::test]
async fn should_send_recovery_code_to_account_email() {
    let user = test_user(5, "carol", "carol@example.com", "password123");
    let fixture = Fixture::new(MockUserRepo::new(vec![user]));

    fixture.init_usecase().execute("carol", &test_ctx()).await.unwrap();

    let code = fixture
        .codes
        .plaintext("carol", CodePurpose::Recovery)
        .expect("recovery code generated");
    assert!(matches!(
        &fixture.mailer.sent.lock().unwrap()[0],
        SentMail::RecoveryCode { email, code: sent }
            if email == "carol@example.com" && *sent == code
    ));
    let row = fixture.audit.find(AuditAction::RecoveryInit).unwrap();
    assert!(row.success);
}

#[tokio::test]
async fn should_respond_uniformly_for_unknown_username() {
    let fixture = Fixture::new(MockUserRepo::empty());

    // The caller cannot tell an unknown account from a real one.
    let result = fixture.init_usecase().execute("ghost", &test_ctx()).await;
    assert!(result.is_ok());

    assert_eq!(fixture.codes.count_for("ghost", CodePurpose::Recovery), 0);
    assert_eq!(fixture.mailer.sent_count(), 0);
    let row = fixture.audit.find(AuditAction::RecoveryInit).unwrap();
    assert!(!row.success);
    assert_eq!(row.error_message.as_deref(), Some("user not found"));
}

#[tokio::test]
async fn should_rotate_password_on_valid_code() {
    let user = test_user(5, "carol", "carol@example.com", "old-password");
    let fixture = Fixture::new(MockUserRepo::new(vec![user]));
    let ctx = test_ctx();

    fixture.init_usecase().execute("carol", &ctx).await.unwrap();
    let code = fixture
        .codes
        .plaintext("carol", CodePurpose::Recovery)
        .unwrap();

    fixture
        .confirm_usecase()
        .execute(fixture.confirm_input("carol", &code, "new-password-9"), &ctx)
        .await
        .unwrap();

    let updated = fixture.users.get(5).unwrap();
    assert!(verify_password(
        "new-password-9",
        &updated.password_hash,
        TEST_PASSWORD_SECRET
    ));
    assert!(!verify_password(
        "old-password",
        &updated.password_hash,
        TEST_PASSWORD_SECRET
    ));
    assert_eq!(fixture.audit.count(AuditAction::RecoveryConfirmSuccess), 1);
}

#[tokio::test]
async fn should_reject_confirmation_with_wrong_code() {
    let user = test_user(5, "carol", "carol@example.com", "old-password");
    let fixture = Fixture::new(MockUserRepo::new(vec![user]));
    let ctx = test_ctx();
    fixture.init_usecase().execute("carol", &ctx).await.unwrap();

    let result = fixture
        .confirm_usecase()
        .execute(fixture.confirm_input("carol", "00000", "new-password-9"), &ctx)
        .await;

    assert!(matches!(result, Err(AuthServiceError::InvalidCode)));
    let updated = fixture.users.get(5).unwrap();
    assert!(verify_password(
        "old-password",
        &updated.password_hash,
        TEST_PASSWORD_SECRET
    ));
    assert_eq!(fixture.audit.count(AuditAction::RecoveryConfirmFailed), 1);
}

#[tokio::test]
async fn should_reject_confirmation_for_unknown_user_as_invalid_code() {
    let fixture = Fixture::new(MockUserRepo::empty());
    let ctx = test_ctx();

    // A code row can exist for a name with no account behind it.
    let code = GenerateCodeUseCase {
        codes: fixture.codes.clone(),
        code_length: 5,
    }
    .execute("ghost", CodePurpose::Recovery)
    .await
    .unwrap();

    let result = fixture
        .confirm_usecase()
        .execute(fixture.confirm_input("ghost", &code.code, "new-password-9"), &ctx)
        .await;

    assert!(matches!(result, Err(AuthServiceError::InvalidCode)));
    let row = fixture.audit.find(AuditAction::RecoveryConfirmFailed).unwrap();
    assert_eq!(row.error_message.as_deref(), Some("user not found"));
}

#[tokio::test]
async fn should_accept_replay_until_next_generation_supersedes() {
    // Verification is non-consuming: within the TTL the same code confirms
    // twice. Generating a new code is what ends its life.
    let user = test_user(5, "carol", "carol@example.com", "old-password");
    let fixture = Fixture::new(MockUserRepo::new(vec![user]));
    let ctx = test_ctx();

    fixture.init_usecase().execute("carol", &ctx).await.unwrap();
    let code = fixture
        .codes
        .plaintext("carol", CodePurpose::Recovery)
        .unwrap();

    fixture
        .confirm_usecase()
        .execute(fixture.confirm_input("carol", &code, "password-one1"), &ctx)
        .await
        .unwrap();
    fixture
        .confirm_usecase()
        .execute(fixture.confirm_input("carol", &code, "password-two2"), &ctx)
        .await
        .unwrap();

    // A fresh generation invalidates the replayed code (unless the fresh
    // plaintext collides).
    fixture.init_usecase().execute("carol", &ctx).await.unwrap();
    let fresh = fixture
        .codes
        .plaintext("carol", CodePurpose::Recovery)
        .unwrap();
    if fresh != code {
        let result = fixture
            .confirm_usecase()
            .execute(fixture.confirm_input("carol", &code, "password-three3"), &ctx)
            .await;
        assert!(matches!(result, Err(AuthServiceError::InvalidCode)));
    }
}
