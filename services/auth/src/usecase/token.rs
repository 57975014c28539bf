use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

use savora_auth_types::token::{JwtClaims, validate_token};
use savora_domain::audit::AuditAction;

use crate::domain::repository::{AuditLogRepository, TokenRepository, UserRepository};
use crate::domain::types::{AuditEvent, NewRefreshToken, RequestContext, TokenPair, User};
use crate::error::AuthServiceError;
use crate::usecase::audit::AuditRecorder;

/// Parse a `\d+[smhd]` duration string, e.g. "15m" or "7d".
pub fn parse_ttl(s: &str) -> Option<Duration> {
    let (value, unit) = s.split_at(s.len().checked_sub(1)?);
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = value.parse().ok()?;
    match unit {
        "s" => Some(Duration::seconds(value)),
        "m" => Some(Duration::minutes(value)),
        "h" => Some(Duration::hours(value)),
        "d" => Some(Duration::days(value)),
        _ => None,
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

/// Signs access and refresh tokens from the loaded config. TTL strings that
/// fail to parse fall back to 15 minutes (access) and 7 days (refresh).
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    pub jwt_secret: String,
    pub access_token_ttl: String,
    pub refresh_token_ttl: String,
}

impl TokenIssuer {
    fn access_ttl(&self) -> Duration {
        parse_ttl(&self.access_token_ttl).unwrap_or_else(|| Duration::minutes(15))
    }

    fn refresh_ttl(&self) -> Duration {
        parse_ttl(&self.refresh_token_ttl).unwrap_or_else(|| Duration::days(7))
    }

    /// Short-lived token carrying identity plus the super-privilege claim.
    pub fn issue_access_token(&self, user: &User) -> Result<(String, u64), AuthServiceError> {
        let exp = now_secs() + self.access_ttl().num_seconds().max(0) as u64;
        let claims = JwtClaims {
            sub: user.id.to_string(),
            adm: user.is_super,
            exp,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthServiceError::Internal(e.into()))?;
        Ok((token, exp))
    }

    /// Long-lived signed token. The caller persists it so it stays revocable.
    pub fn create_refresh_token(
        &self,
        user: &User,
    ) -> Result<(String, DateTime<Utc>), AuthServiceError> {
        let ttl = self.refresh_ttl();
        let expires_at = Utc::now() + ttl;
        let claims = JwtClaims {
            sub: user.id.to_string(),
            adm: false,
            exp: now_secs() + ttl.num_seconds().max(0) as u64,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthServiceError::Internal(e.into()))?;
        Ok((token, expires_at))
    }

    /// Issue and persist a refresh token, then pair it with a fresh access
    /// token. Concurrent sign-ins for one user coexist — every call stores
    /// its own row.
    pub async fn issue_pair<T: TokenRepository>(
        &self,
        user: &User,
        tokens: &T,
    ) -> Result<TokenPair, AuthServiceError> {
        let (refresh_token, expires_at) = self.create_refresh_token(user)?;
        tokens
            .create(&NewRefreshToken {
                user_id: user.id,
                token: refresh_token.clone(),
                expires_at,
            })
            .await?;
        let (access_token, access_token_exp) = self.issue_access_token(user)?;
        Ok(TokenPair {
            access_token,
            access_token_exp,
            refresh_token,
        })
    }
}

// ── RefreshAccessToken ───────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RefreshAccessTokenOutput {
    pub access_token: String,
    pub access_token_exp: u64,
}

pub struct RefreshAccessTokenUseCase<U: UserRepository, T: TokenRepository> {
    pub users: U,
    pub tokens: T,
    pub issuer: TokenIssuer,
}

impl<U: UserRepository, T: TokenRepository> RefreshAccessTokenUseCase<U, T> {
    pub async fn execute(
        &self,
        refresh_token_value: &str,
    ) -> Result<RefreshAccessTokenOutput, AuthServiceError> {
        // Signed claim first (signature + exp), then the stored row.
        validate_token(refresh_token_value, &self.issuer.jwt_secret)
            .map_err(|_| AuthServiceError::Unauthorized)?;

        let stored = self
            .tokens
            .find_by_token(refresh_token_value)
            .await?
            .ok_or(AuthServiceError::Unauthorized)?;

        // The stored expiry column is enforced in addition to the claim: a
        // row kept past its expires_at must not mint access tokens.
        if Utc::now() >= stored.expires_at {
            return Err(AuthServiceError::Unauthorized);
        }

        let user = self
            .users
            .find_by_id(stored.user_id)
            .await?
            .ok_or(AuthServiceError::Unauthorized)?;
        if user.is_deleted() {
            return Err(AuthServiceError::EntityDeleted);
        }

        let (access_token, access_token_exp) = self.issuer.issue_access_token(&user)?;
        Ok(RefreshAccessTokenOutput {
            access_token,
            access_token_exp,
        })
    }
}

// ── SignOut ──────────────────────────────────────────────────────────────────

pub struct SignOutUseCase<T: TokenRepository, A: AuditLogRepository> {
    pub tokens: T,
    pub audit: AuditRecorder<A>,
}

impl<T: TokenRepository, A: AuditLogRepository> SignOutUseCase<T, A> {
    /// Delete every refresh token for the user. Idempotent — revoking zero
    /// rows is a success.
    pub async fn execute(
        &self,
        user_id: i64,
        ctx: &RequestContext,
    ) -> Result<(), AuthServiceError> {
        let revoked = self.tokens.delete_by_user(user_id).await?;
        self.audit
            .record(
                AuditEvent::success(AuditAction::SignOut, Some(user_id), ctx)
                    .with_metadata(json!({ "revoked_tokens": revoked })),
            )
            .await;
        Ok(())
    }
}
