#![allow(async_fn_in_trait)]

use chrono::NaiveDate;

use savora_domain::pagination::PageRequest;

use crate::domain::types::{
    ActivityBucket, AuditEvent, CodePurpose, ExternalIdentity, NewCode, NewProfile,
    NewRefreshToken, NewUser, OneTimeCode, RefreshTokenRecord, User, UserPatch,
};
use crate::error::AuthServiceError;

/// Credential store for user records.
///
/// `find_by_username` and `find_by_email` resolve live rows only — a
/// soft-deleted account releases its identifiers. `find_by_id` resolves any
/// row so refresh and admin flows can see soft-deleted users.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthServiceError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError>;

    /// Insert the user and its profile row in one transaction.
    /// A unique-constraint violation surfaces as `AlreadyExistEntity`.
    async fn create(&self, user: &NewUser, profile: &NewProfile)
    -> Result<User, AuthServiceError>;

    /// Apply the patch and return the post-update record.
    async fn update(&self, id: i64, patch: &UserPatch) -> Result<User, AuthServiceError>;

    /// Soft-delete (set `deleted_at`) and return the deleted record.
    async fn soft_delete(&self, id: i64) -> Result<User, AuthServiceError>;

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, AuthServiceError>;
}

/// Shared cache in front of the credential store, keyed independently by id
/// and by username. Entries have no component-level TTL; staleness is
/// bounded only by explicit invalidation.
pub trait UserCache: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, AuthServiceError>;
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, AuthServiceError>;

    /// Store the record under both keys.
    async fn put(&self, user: &User) -> Result<(), AuthServiceError>;

    /// Drop both keys for the given identity.
    async fn invalidate(&self, id: i64, username: &str) -> Result<(), AuthServiceError>;
}

/// Repository for one-time codes.
pub trait CodeRepository: Send + Sync {
    /// Delete every code for (username, purpose) and insert the new one, in
    /// a single transaction. The returned record carries the assigned id.
    async fn replace(&self, code: &NewCode) -> Result<OneTimeCode, AuthServiceError>;

    /// Most recent code matching (username, code, purpose), expired or not.
    async fn find_latest(
        &self,
        username: &str,
        code: &str,
        purpose: CodePurpose,
    ) -> Result<Option<OneTimeCode>, AuthServiceError>;
}

/// Repository for persisted refresh tokens.
pub trait TokenRepository: Send + Sync {
    async fn create(
        &self,
        token: &NewRefreshToken,
    ) -> Result<RefreshTokenRecord, AuthServiceError>;

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AuthServiceError>;

    /// Delete all refresh tokens for a user. Returns the number of rows
    /// deleted; deleting zero rows is not an error.
    async fn delete_by_user(&self, user_id: i64) -> Result<u64, AuthServiceError>;
}

/// Append-only audit log store.
pub trait AuditLogRepository: Send + Sync {
    async fn append(&self, event: &AuditEvent) -> Result<(), AuthServiceError>;

    /// Successful registrations and logins per calendar day over the
    /// inclusive date range.
    async fn activity_by_day(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ActivityBucket>, AuthServiceError>;
}

/// Outbound email capability. Transport and templating live outside this
/// service; the production adapter enqueues outbox events for a relay.
pub trait Mailer: Send + Sync {
    async fn send_signup_code(&self, email: &str, code: &str) -> Result<(), AuthServiceError>;
    async fn send_recovery_code(&self, email: &str, code: &str) -> Result<(), AuthServiceError>;
    async fn send_welcome(&self, email: &str, first_name: &str)
    -> Result<(), AuthServiceError>;
    async fn send_password_changed(&self, email: &str) -> Result<(), AuthServiceError>;
}

/// External ID-token verification for one federated provider.
pub trait IdTokenVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<ExternalIdentity, AuthServiceError>;
}
