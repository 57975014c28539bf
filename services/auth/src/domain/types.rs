use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use savora_domain::audit::AuditAction;
use savora_domain::user::RoleTag;

/// Full account record as stored in the credential store.
///
/// Serde derives exist because the record is cached as JSON; the HTTP layer
/// exposes its own response shapes and never serializes this directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_super: bool,
    pub roles: Vec<RoleTag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// A soft-deleted user is unusable for authentication, even when a stale
    /// cache entry still serves the record.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input for creating a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_super: bool,
    pub roles: Vec<RoleTag>,
}

/// One-to-one profile extension, created in the same transaction as the user.
#[derive(Debug, Clone, Default)]
pub struct NewProfile {
    pub birth_date: Option<NaiveDate>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub height_cm: Option<f32>,
    pub weight_kg: Option<f32>,
}

/// Field-wise patch for user updates. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.username.is_none()
            && self.password_hash.is_none()
            && self.is_active.is_none()
    }
}

// ── One-time codes ───────────────────────────────────────────────────────────

/// What a one-time code authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodePurpose {
    Signup,
    Recovery,
}

impl CodePurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Recovery => "recovery",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "signup" => Some(Self::Signup),
            "recovery" => Some(Self::Recovery),
            _ => None,
        }
    }
}

/// One-time verification code. At most one active code exists per
/// (username, purpose) — generation replaces any predecessor. For
/// signup-purpose codes the username field holds the email address, since
/// no account exists yet.
#[derive(Debug, Clone)]
pub struct OneTimeCode {
    pub id: i64,
    pub username: String,
    pub code: String,
    pub purpose: CodePurpose,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OneTimeCode {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Input for inserting a code row.
#[derive(Debug, Clone)]
pub struct NewCode {
    pub username: String,
    pub code: String,
    pub purpose: CodePurpose,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// One-time code time-to-live in seconds.
pub const CODE_TTL_SECS: i64 = 600;

// ── Refresh tokens ───────────────────────────────────────────────────────────

/// Persisted refresh token row.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a refresh token row.
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Access/refresh token pair returned by every successful authentication.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
}

// ── Audit trail ──────────────────────────────────────────────────────────────

/// Transport-level request context, extracted once at the boundary and
/// passed explicitly — never derived from ambient state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub ip: String,
    pub user_agent: String,
    pub device: String,
}

/// Audit event to append. Rows are immutable once written.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub user_id: Option<i64>,
    pub action: AuditAction,
    pub context: RequestContext,
    pub success: bool,
    pub error_message: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn success(action: AuditAction, user_id: Option<i64>, context: &RequestContext) -> Self {
        Self {
            user_id,
            action,
            context: context.clone(),
            success: true,
            error_message: None,
            metadata: None,
        }
    }

    pub fn failure(
        action: AuditAction,
        user_id: Option<i64>,
        context: &RequestContext,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            action,
            context: context.clone(),
            success: false,
            error_message: Some(error_message.into()),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Per-day aggregation of successful registrations and logins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityBucket {
    pub date: NaiveDate,
    pub registrations: i64,
    pub logins: i64,
}

// ── OAuth federation ─────────────────────────────────────────────────────────

/// Federated identity provider tag. A closed set — adding a provider means
/// adding a variant and registering a strategy for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Google,
    Apple,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Apple => "apple",
        }
    }
}

/// Raw federated-login request: the provider tag plus the provider-issued
/// ID token to verify.
#[derive(Debug, Clone)]
pub struct OauthPayload {
    pub provider: ProviderKind,
    pub id_token: String,
}

/// Claims extracted from a verified external ID token.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    /// Provider-stable subject identifier.
    pub subject: String,
    pub email: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}
