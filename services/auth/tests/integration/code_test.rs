use chrono::{Duration, Utc};

use savora_auth::domain::repository::CodeRepository;
use savora_auth::domain::types::{CodePurpose, NewCode};
use savora_auth::usecase::code::{GenerateCodeUseCase, VerifyCodeUseCase};

use crate::helpers::MockCodeRepo;

fn generate(repo: &MockCodeRepo) -> GenerateCodeUseCase<MockCodeRepo> {
    GenerateCodeUseCase {
        codes: repo.clone(),
        code_length: 5,
    }
}

fn verify(repo: &MockCodeRepo) -> VerifyCodeUseCase<MockCodeRepo> {
    VerifyCodeUseCase {
        codes: repo.clone(),
    }
}

#[tokio::test]
async fn should_verify_code_immediately_after_generation() {
    let repo = MockCodeRepo::empty();
    let code = generate(&repo)
        .execute("carol", CodePurpose::Recovery)
        .await
        .unwrap();

    assert_eq!(code.code.len(), 5);
    assert!(code.code.bytes().all(|b| b.is_ascii_digit()));

    let ok = verify(&repo)
        .execute("carol", &code.code, CodePurpose::Recovery)
        .await
        .unwrap();
    assert!(ok);
}

#[tokio::test]
async fn should_reject_expired_code() {
    let repo = MockCodeRepo::empty();
    let now = Utc::now();
    repo.replace(&NewCode {
        username: "carol".to_owned(),
        code: "11111".to_owned(),
        purpose: CodePurpose::Recovery,
        created_at: now - Duration::minutes(11),
        expires_at: now - Duration::minutes(1),
    })
    .await
    .unwrap();

    let ok = verify(&repo)
        .execute("carol", "11111", CodePurpose::Recovery)
        .await
        .unwrap();
    assert!(!ok);
}

#[tokio::test]
async fn should_reject_unknown_code() {
    let repo = MockCodeRepo::empty();
    let ok = verify(&repo)
        .execute("carol", "99999", CodePurpose::Recovery)
        .await
        .unwrap();
    assert!(!ok);
}

#[tokio::test]
async fn should_supersede_previous_code_on_regeneration() {
    let repo = MockCodeRepo::empty();
    let first = generate(&repo)
        .execute("carol", CodePurpose::Recovery)
        .await
        .unwrap();
    let second = generate(&repo)
        .execute("carol", CodePurpose::Recovery)
        .await
        .unwrap();

    // Only the latest code exists for the pair.
    assert_eq!(repo.count_for("carol", CodePurpose::Recovery), 1);

    let first_ok = verify(&repo)
        .execute("carol", &first.code, CodePurpose::Recovery)
        .await
        .unwrap();
    let second_ok = verify(&repo)
        .execute("carol", &second.code, CodePurpose::Recovery)
        .await
        .unwrap();
    // The regenerated code can collide with the old plaintext; only then is
    // the old string still accepted.
    if first.code != second.code {
        assert!(!first_ok);
    }
    assert!(second_ok);
}

#[tokio::test]
async fn should_scope_codes_by_purpose() {
    let repo = MockCodeRepo::empty();
    let code = generate(&repo)
        .execute("carol", CodePurpose::Signup)
        .await
        .unwrap();

    let wrong_purpose = verify(&repo)
        .execute("carol", &code.code, CodePurpose::Recovery)
        .await
        .unwrap();
    assert!(!wrong_purpose);
}

#[tokio::test]
async fn should_scope_codes_by_username() {
    let repo = MockCodeRepo::empty();
    let code = generate(&repo)
        .execute("carol", CodePurpose::Recovery)
        .await
        .unwrap();

    let other_user = verify(&repo)
        .execute("dave", &code.code, CodePurpose::Recovery)
        .await
        .unwrap();
    assert!(!other_user);
}

#[tokio::test]
async fn should_honor_configured_code_length() {
    let repo = MockCodeRepo::empty();
    let usecase = GenerateCodeUseCase {
        codes: repo.clone(),
        code_length: 8,
    };
    let code = usecase.execute("carol", CodePurpose::Signup).await.unwrap();
    assert_eq!(code.code.len(), 8);
}
