use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use savora_auth_types::identity::IdentityHeaders;
use savora_domain::pagination::PageRequest;
use savora_domain::user::RoleTag;

use crate::domain::types::User;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::admin::{
    AdminUpdateInput, DeactivateUserUseCase, DeleteUserUseCase, GetActivityUseCase,
    GetUserUseCase, ListUsersUseCase, UpdateUserUseCase,
};

/// Capability guard at the boundary: everything below runs unchecked.
fn require_super(identity: &IdentityHeaders) -> Result<(), AuthServiceError> {
    if identity.is_super {
        Ok(())
    } else {
        Err(AuthServiceError::Forbidden)
    }
}

/// Admin view of an account. Unlike the authentication responses this one
/// exposes the soft-delete marker, since admin lookups resolve deleted rows.
#[derive(Serialize)]
pub struct AdminUserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub is_super: bool,
    pub roles: Vec<RoleTag>,
    #[serde(serialize_with = "savora_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "savora_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "savora_core::serde::to_rfc3339_ms_opt")]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<User> for AdminUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            is_super: user.is_super,
            roles: user.roles,
            created_at: user.created_at,
            updated_at: user.updated_at,
            deleted_at: user.deleted_at,
        }
    }
}

// ── GET /admin/users ─────────────────────────────────────────────────────────

pub async fn list_users(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    require_super(&identity)?;
    let usecase = ListUsersUseCase {
        users: state.user_repo(),
    };
    let users = usecase.execute(page).await?;
    Ok(Json(
        users.into_iter().map(AdminUserResponse::from).collect::<Vec<_>>(),
    ))
}

// ── GET /admin/users/{id} ────────────────────────────────────────────────────

pub async fn get_user(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AuthServiceError> {
    require_super(&identity)?;
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(user_id).await?;
    Ok(Json(AdminUserResponse::from(user)))
}

// ── PATCH /admin/users/{id} ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AdminUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn update_user(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(body): Json<AdminUpdateRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    require_super(&identity)?;
    let usecase = UpdateUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(
            user_id,
            AdminUpdateInput {
                first_name: body.first_name,
                last_name: body.last_name,
                username: body.username,
                is_active: body.is_active,
            },
        )
        .await?;
    Ok(Json(AdminUserResponse::from(user)))
}

// ── POST /admin/users/{id}/deactivate ────────────────────────────────────────

pub async fn deactivate_user(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AuthServiceError> {
    require_super(&identity)?;
    let usecase = DeactivateUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(user_id).await?;
    Ok(Json(AdminUserResponse::from(user)))
}

// ── DELETE /admin/users/{id} ─────────────────────────────────────────────────

pub async fn delete_user(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AuthServiceError> {
    require_super(&identity)?;
    let usecase = DeleteUserUseCase {
        users: state.user_repo(),
    };
    usecase.execute(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /admin/activity ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ActivityQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub async fn get_activity(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<impl IntoResponse, AuthServiceError> {
    require_super(&identity)?;
    let usecase = GetActivityUseCase {
        audit_logs: state.audit_log_repo(),
    };
    let buckets = usecase.execute(query.start, query.end).await?;
    Ok(Json(buckets))
}
