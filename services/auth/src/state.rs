use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use crate::infra::cache::RedisUserCache;
use crate::infra::cached::CachedUserRepository;
use crate::infra::db::{
    DbAuditLogRepository, DbCodeRepository, DbTokenRepository, DbUserRepository,
};
use crate::infra::google::GoogleTokenVerifier;
use crate::infra::mail::OutboxMailer;
use crate::usecase::audit::AuditRecorder;
use crate::usecase::notify::Notifier;
use crate::usecase::token::TokenIssuer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub http: reqwest::Client,
    pub issuer: TokenIssuer,
    pub password_secret: String,
    pub code_length: usize,
    pub google_client_id: String,
}

impl AppState {
    /// Cache-fronted credential store — the only user repository handlers
    /// should touch.
    pub fn user_repo(&self) -> CachedUserRepository<DbUserRepository, RedisUserCache> {
        CachedUserRepository {
            store: DbUserRepository {
                db: self.db.clone(),
            },
            cache: RedisUserCache {
                pool: self.redis.clone(),
            },
        }
    }

    pub fn code_repo(&self) -> DbCodeRepository {
        DbCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn token_repo(&self) -> DbTokenRepository {
        DbTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn audit_log_repo(&self) -> DbAuditLogRepository {
        DbAuditLogRepository {
            db: self.db.clone(),
        }
    }

    pub fn audit(&self) -> AuditRecorder<DbAuditLogRepository> {
        AuditRecorder {
            repo: self.audit_log_repo(),
        }
    }

    pub fn mailer(&self) -> OutboxMailer {
        OutboxMailer {
            db: self.db.clone(),
        }
    }

    pub fn notifier(&self) -> Notifier<OutboxMailer> {
        Notifier::new(self.mailer())
    }

    pub fn google_verifier(&self) -> GoogleTokenVerifier {
        GoogleTokenVerifier {
            http: self.http.clone(),
            client_id: self.google_client_id.clone(),
        }
    }
}
