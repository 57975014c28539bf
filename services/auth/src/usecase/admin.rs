use chrono::NaiveDate;

use savora_domain::pagination::PageRequest;

use crate::domain::repository::{AuditLogRepository, UserRepository};
use crate::domain::types::{ActivityBucket, User, UserPatch};
use crate::error::AuthServiceError;

// Privilege is enforced by the capability guard at the handler boundary;
// these use cases perform no extra checks.

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListUsersUseCase<U> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<User>, AuthServiceError> {
        self.users.list(page.clamped()).await
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, user_id: i64) -> Result<User, AuthServiceError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::NotFoundEntity)
    }
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct AdminUpdateInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub is_active: Option<bool>,
}

pub struct UpdateUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateUserUseCase<U> {
    pub async fn execute(
        &self,
        user_id: i64,
        input: AdminUpdateInput,
    ) -> Result<User, AuthServiceError> {
        let patch = UserPatch {
            first_name: input.first_name,
            last_name: input.last_name,
            username: input.username,
            password_hash: None,
            is_active: input.is_active,
        };
        if patch.is_empty() {
            return self
                .users
                .find_by_id(user_id)
                .await?
                .ok_or(AuthServiceError::NotFoundEntity);
        }
        self.users.update(user_id, &patch).await
    }
}

// ── DeactivateUser ───────────────────────────────────────────────────────────

pub struct DeactivateUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> DeactivateUserUseCase<U> {
    pub async fn execute(&self, user_id: i64) -> Result<User, AuthServiceError> {
        let patch = UserPatch {
            is_active: Some(false),
            ..Default::default()
        };
        self.users.update(user_id, &patch).await
    }
}

// ── DeleteUser (soft) ────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> DeleteUserUseCase<U> {
    pub async fn execute(&self, user_id: i64) -> Result<User, AuthServiceError> {
        self.users.soft_delete(user_id).await
    }
}

// ── GetActivity ──────────────────────────────────────────────────────────────

pub struct GetActivityUseCase<A: AuditLogRepository> {
    pub audit_logs: A,
}

impl<A: AuditLogRepository> GetActivityUseCase<A> {
    pub async fn execute(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ActivityBucket>, AuthServiceError> {
        self.audit_logs.activity_by_day(start, end).await
    }
}
