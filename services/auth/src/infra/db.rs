use anyhow::Context as _;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, SqlErr, Statement, TransactionError,
    TransactionTrait,
};

use savora_auth_schema::{audit_logs, codes, profiles, tokens, users};
use savora_domain::audit::AuditAction;
use savora_domain::pagination::PageRequest;

use crate::domain::repository::{AuditLogRepository, CodeRepository, TokenRepository, UserRepository};
use crate::domain::types::{
    ActivityBucket, AuditEvent, CodePurpose, NewCode, NewProfile, NewRefreshToken, NewUser,
    OneTimeCode, RefreshTokenRecord, User, UserPatch,
};
use crate::error::AuthServiceError;

/// Surface unique-constraint violations as the domain conflict error;
/// everything else is internal.
fn db_err(e: DbErr, ctx: &'static str) -> AuthServiceError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        AuthServiceError::AlreadyExistEntity
    } else {
        AuthServiceError::Internal(anyhow::Error::new(e).context(ctx))
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .context("find user by username")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn create(
        &self,
        user: &NewUser,
        profile: &NewProfile,
    ) -> Result<User, AuthServiceError> {
        let roles = serde_json::to_value(&user.roles)
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        let model = self
            .db
            .transaction::<_, users::Model, DbErr>(|txn| {
                let user = user.clone();
                let profile = profile.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let model = users::ActiveModel {
                        first_name: Set(user.first_name),
                        last_name: Set(user.last_name),
                        username: Set(user.username),
                        email: Set(user.email),
                        password_hash: Set(user.password_hash),
                        is_active: Set(true),
                        is_super: Set(user.is_super),
                        roles: Set(roles),
                        created_at: Set(now),
                        updated_at: Set(now),
                        deleted_at: Set(None),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    profiles::ActiveModel {
                        user_id: Set(model.id),
                        birth_date: Set(profile.birth_date),
                        bio: Set(profile.bio),
                        photo_url: Set(profile.photo_url),
                        height_cm: Set(profile.height_cm),
                        weight_kg: Set(profile.weight_kg),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    Ok(model)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(e) | TransactionError::Transaction(e) => {
                    db_err(e, "create user with profile")
                }
            })?;
        user_from_model(model)
    }

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<User, AuthServiceError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(first_name) = &patch.first_name {
            am.first_name = Set(first_name.clone());
        }
        if let Some(last_name) = &patch.last_name {
            am.last_name = Set(last_name.clone());
        }
        if let Some(username) = &patch.username {
            am.username = Set(username.clone());
        }
        if let Some(password_hash) = &patch.password_hash {
            am.password_hash = Set(password_hash.clone());
        }
        if let Some(is_active) = patch.is_active {
            am.is_active = Set(is_active);
        }
        am.updated_at = Set(Utc::now());

        let model = am.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => AuthServiceError::NotFoundEntity,
            e => db_err(e, "update user"),
        })?;
        user_from_model(model)
    }

    async fn soft_delete(&self, id: i64) -> Result<User, AuthServiceError> {
        let now = Utc::now();
        let model = users::ActiveModel {
            id: Set(id),
            deleted_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| match e {
            DbErr::RecordNotUpdated => AuthServiceError::NotFoundEntity,
            e => db_err(e, "soft-delete user"),
        })?;
        user_from_model(model)
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, AuthServiceError> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .limit(u64::from(page.per_page))
            .offset(page.offset())
            .all(&self.db)
            .await
            .context("list users")?;
        models.into_iter().map(user_from_model).collect()
    }
}

fn user_from_model(model: users::Model) -> Result<User, AuthServiceError> {
    let roles = serde_json::from_value(model.roles)
        .map_err(|e| AuthServiceError::Internal(anyhow::Error::new(e).context("decode roles")))?;
    Ok(User {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        is_active: model.is_active,
        is_super: model.is_super,
        roles,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
    })
}

// ── Code repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCodeRepository {
    pub db: DatabaseConnection,
}

impl CodeRepository for DbCodeRepository {
    async fn replace(&self, code: &NewCode) -> Result<OneTimeCode, AuthServiceError> {
        let model = self
            .db
            .transaction::<_, codes::Model, DbErr>(|txn| {
                let code = code.clone();
                Box::pin(async move {
                    codes::Entity::delete_many()
                        .filter(codes::Column::Username.eq(code.username.clone()))
                        .filter(codes::Column::Purpose.eq(code.purpose.as_str()))
                        .exec(txn)
                        .await?;

                    codes::ActiveModel {
                        username: Set(code.username),
                        code: Set(code.code),
                        purpose: Set(code.purpose.as_str().to_owned()),
                        created_at: Set(code.created_at),
                        expires_at: Set(code.expires_at),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(e) | TransactionError::Transaction(e) => {
                    db_err(e, "replace one-time code")
                }
            })?;
        code_from_model(model)
    }

    async fn find_latest(
        &self,
        username: &str,
        code: &str,
        purpose: CodePurpose,
    ) -> Result<Option<OneTimeCode>, AuthServiceError> {
        let model = codes::Entity::find()
            .filter(codes::Column::Username.eq(username))
            .filter(codes::Column::Code.eq(code))
            .filter(codes::Column::Purpose.eq(purpose.as_str()))
            .order_by_desc(codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest one-time code")?;
        model.map(code_from_model).transpose()
    }
}

fn code_from_model(model: codes::Model) -> Result<OneTimeCode, AuthServiceError> {
    let purpose = CodePurpose::from_str(&model.purpose).ok_or_else(|| {
        AuthServiceError::Internal(anyhow::anyhow!("unknown code purpose: {}", model.purpose))
    })?;
    Ok(OneTimeCode {
        id: model.id,
        username: model.username,
        code: model.code,
        purpose,
        created_at: model.created_at,
        expires_at: model.expires_at,
    })
}

// ── Token repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTokenRepository {
    pub db: DatabaseConnection,
}

impl TokenRepository for DbTokenRepository {
    async fn create(
        &self,
        token: &NewRefreshToken,
    ) -> Result<RefreshTokenRecord, AuthServiceError> {
        let model = tokens::ActiveModel {
            user_id: Set(token.user_id),
            token: Set(token.token.clone()),
            expires_at: Set(token.expires_at),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_err(e, "create refresh token"))?;
        Ok(token_from_model(model))
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AuthServiceError> {
        let model = tokens::Entity::find()
            .filter(tokens::Column::Token.eq(token))
            .one(&self.db)
            .await
            .context("find refresh token")?;
        Ok(model.map(token_from_model))
    }

    async fn delete_by_user(&self, user_id: i64) -> Result<u64, AuthServiceError> {
        let result = tokens::Entity::delete_many()
            .filter(tokens::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("delete refresh tokens by user")?;
        Ok(result.rows_affected)
    }
}

fn token_from_model(model: tokens::Model) -> RefreshTokenRecord {
    RefreshTokenRecord {
        id: model.id,
        user_id: model.user_id,
        token: model.token,
        expires_at: model.expires_at,
        created_at: model.created_at,
    }
}

// ── Audit log repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuditLogRepository {
    pub db: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct ActivityRow {
    day: NaiveDate,
    registrations: i64,
    logins: i64,
}

fn action_list(actions: &[AuditAction]) -> String {
    actions
        .iter()
        .map(|a| format!("'{}'", a.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl AuditLogRepository for DbAuditLogRepository {
    async fn append(&self, event: &AuditEvent) -> Result<(), AuthServiceError> {
        audit_logs::ActiveModel {
            user_id: Set(event.user_id),
            action: Set(event.action.as_str().to_owned()),
            ip: Set(event.context.ip.clone()),
            user_agent: Set(event.context.user_agent.clone()),
            device: Set(event.context.device.clone()),
            success: Set(event.success),
            error_message: Set(event.error_message.clone()),
            metadata: Set(event.metadata.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("append audit log")?;
        Ok(())
    }

    async fn activity_by_day(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ActivityBucket>, AuthServiceError> {
        // Action lists are compile-time enum strings, safe to inline.
        let sql = format!(
            "SELECT CAST(created_at AS DATE) AS day, \
             COUNT(*) FILTER (WHERE action IN ({registrations})) AS registrations, \
             COUNT(*) FILTER (WHERE action IN ({logins})) AS logins \
             FROM audit_logs \
             WHERE success = TRUE AND CAST(created_at AS DATE) BETWEEN $1 AND $2 \
             GROUP BY day ORDER BY day ASC",
            registrations = action_list(AuditAction::registration_actions()),
            logins = action_list(AuditAction::login_actions()),
        );
        let rows = ActivityRow::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DbBackend::Postgres,
            sql,
            [start.into(), end.into()],
        ))
        .all(&self.db)
        .await
        .context("aggregate activity by day")?;

        Ok(rows
            .into_iter()
            .map(|row| ActivityBucket {
                date: row.day,
                registrations: row.registrations,
                logins: row.logins,
            })
            .collect())
    }
}
