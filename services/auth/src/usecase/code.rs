use chrono::{Duration, Utc};
use rand::RngExt;

use crate::domain::repository::CodeRepository;
use crate::domain::types::{CODE_TTL_SECS, CodePurpose, NewCode, OneTimeCode};
use crate::error::AuthServiceError;

/// Charset for generated one-time codes. Digits only; length comes from
/// config.
const CHARSET: &[u8] = b"0123456789";

fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

pub struct GenerateCodeUseCase<C: CodeRepository> {
    pub codes: C,
    pub code_length: usize,
}

impl<C: CodeRepository> GenerateCodeUseCase<C> {
    /// Generate a fresh code for (username, purpose), superseding any
    /// predecessor. The returned record carries the plaintext code.
    pub async fn execute(
        &self,
        username: &str,
        purpose: CodePurpose,
    ) -> Result<OneTimeCode, AuthServiceError> {
        let now = Utc::now();
        let code = NewCode {
            username: username.to_owned(),
            code: generate_code(self.code_length),
            purpose,
            created_at: now,
            expires_at: now + Duration::seconds(CODE_TTL_SECS),
        };
        self.codes.replace(&code).await
    }
}

pub struct VerifyCodeUseCase<C: CodeRepository> {
    pub codes: C,
}

impl<C: CodeRepository> VerifyCodeUseCase<C> {
    /// Non-consuming: a verified code stays valid until the next generation
    /// for the same (username, purpose) supersedes it. Callers must proceed
    /// immediately rather than rely on this to enforce single use.
    pub async fn execute(
        &self,
        username: &str,
        code: &str,
        purpose: CodePurpose,
    ) -> Result<bool, AuthServiceError> {
        match self.codes.find_latest(username, code, purpose).await? {
            Some(found) => Ok(!found.is_expired()),
            None => Ok(false),
        }
    }
}
