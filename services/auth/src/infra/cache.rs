use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;

use crate::domain::repository::UserCache;
use crate::domain::types::User;
use crate::error::AuthServiceError;

/// Redis-backed user cache. One record lives under two keys (id and
/// username) so both lookup paths hit. Entries carry no TTL — consistency
/// is maintained by explicit invalidation on every write.
#[derive(Clone)]
pub struct RedisUserCache {
    pub pool: Pool,
}

fn id_key(id: i64) -> String {
    format!("auth:user:id:{}", id)
}

fn username_key(username: &str) -> String {
    format!("auth:user:username:{}", username)
}

impl RedisUserCache {
    async fn get(&self, key: &str) -> Result<Option<User>, AuthServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| AuthServiceError::Internal(e.into()))?;
        let Some(json) = value else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                // An undecodable entry is treated as a miss rather than an
                // outage; the store remains the source of truth.
                tracing::warn!(error = %e, key, "dropping undecodable user cache entry");
                Ok(None)
            }
        }
    }
}

impl UserCache for RedisUserCache {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, AuthServiceError> {
        self.get(&id_key(id)).await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, AuthServiceError> {
        self.get(&username_key(username)).await
    }

    async fn put(&self, user: &User) -> Result<(), AuthServiceError> {
        let json =
            serde_json::to_string(user).map_err(|e| AuthServiceError::Internal(e.into()))?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        let (): () = conn
            .set(&id_key(user.id), &json)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| AuthServiceError::Internal(e.into()))?;
        let (): () = conn
            .set(&username_key(&user.username), &json)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| AuthServiceError::Internal(e.into()))?;
        Ok(())
    }

    async fn invalidate(&self, id: i64, username: &str) -> Result<(), AuthServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        let _: u64 = conn
            .del(&[id_key(id), username_key(username)])
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| AuthServiceError::Internal(e.into()))?;
        Ok(())
    }
}
