use savora_domain::pagination::PageRequest;

use crate::domain::repository::{UserCache, UserRepository};
use crate::domain::types::{NewProfile, NewUser, User, UserPatch};
use crate::error::AuthServiceError;

/// Read-through cache wrapper around the credential store.
///
/// Cache failures never fail the operation: reads degrade to a store
/// lookup, writes after a successful store write are logged and dropped.
/// Write ordering on `update` is store first, then invalidation of the
/// pre-update identity's keys, then repopulation with the fresh record —
/// a username change must not leave the old key serving the user.
pub struct CachedUserRepository<S: UserRepository, C: UserCache> {
    pub store: S,
    pub cache: C,
}

impl<S: UserRepository, C: UserCache> CachedUserRepository<S, C> {
    async fn cache_get_by_id(&self, id: i64) -> Option<User> {
        match self.cache.get_by_id(id).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, id, "user cache read failed");
                None
            }
        }
    }

    async fn cache_get_by_username(&self, username: &str) -> Option<User> {
        match self.cache.get_by_username(username).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, username, "user cache read failed");
                None
            }
        }
    }

    async fn fill(&self, user: &User) {
        if let Err(e) = self.cache.put(user).await {
            tracing::warn!(error = %e, id = user.id, "user cache write failed");
        }
    }

    async fn drop_keys(&self, id: i64, username: &str) {
        if let Err(e) = self.cache.invalidate(id, username).await {
            tracing::warn!(error = %e, id, "user cache invalidation failed");
        }
    }
}

impl<S: UserRepository, C: UserCache> UserRepository for CachedUserRepository<S, C> {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthServiceError> {
        if let Some(user) = self.cache_get_by_id(id).await {
            return Ok(Some(user));
        }
        let user = self.store.find_by_id(id).await?;
        if let Some(ref user) = user {
            self.fill(user).await;
        }
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthServiceError> {
        if let Some(user) = self.cache_get_by_username(username).await {
            return Ok(Some(user));
        }
        let user = self.store.find_by_username(username).await?;
        if let Some(ref user) = user {
            self.fill(user).await;
        }
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError> {
        // No email key exists; the hit still warms both identity keys.
        let user = self.store.find_by_email(email).await?;
        if let Some(ref user) = user {
            self.fill(user).await;
        }
        Ok(user)
    }

    async fn create(
        &self,
        user: &NewUser,
        profile: &NewProfile,
    ) -> Result<User, AuthServiceError> {
        let created = self.store.create(user, profile).await?;
        self.fill(&created).await;
        Ok(created)
    }

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<User, AuthServiceError> {
        // Capture the pre-update identity first: if the patch renames the
        // user, the stale username key must be dropped.
        let before = self.store.find_by_id(id).await?;
        let updated = self.store.update(id, patch).await?;
        if let Some(before) = before {
            self.drop_keys(before.id, &before.username).await;
        }
        self.fill(&updated).await;
        Ok(updated)
    }

    async fn soft_delete(&self, id: i64) -> Result<User, AuthServiceError> {
        let deleted = self.store.soft_delete(id).await?;
        self.drop_keys(deleted.id, &deleted.username).await;
        Ok(deleted)
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, AuthServiceError> {
        self.store.list(page).await
    }
}
