use savora_auth::domain::repository::UserRepository;
use savora_auth::domain::types::UserPatch;
use savora_auth::infra::cached::CachedUserRepository;

use crate::helpers::{FailingUserCache, InMemoryUserCache, MockUserRepo, test_user};

fn cached(
    store: MockUserRepo,
    cache: InMemoryUserCache,
) -> CachedUserRepository<MockUserRepo, InMemoryUserCache> {
    CachedUserRepository { store, cache }
}

#[tokio::test]
async fn should_populate_both_keys_on_read_through() {
    let user = test_user(1, "carol", "carol@example.com", "password123");
    let cache = InMemoryUserCache::empty();
    let repo = cached(MockUserRepo::new(vec![user]), cache.clone());

    let found = repo.find_by_username("carol").await.unwrap().unwrap();
    assert_eq!(found.id, 1);

    assert!(cache.has_id(1));
    assert!(cache.has_username("carol"));
}

#[tokio::test]
async fn should_warm_both_keys_on_email_lookup() {
    let user = test_user(1, "carol", "carol@example.com", "password123");
    let cache = InMemoryUserCache::empty();
    let repo = cached(MockUserRepo::new(vec![user]), cache.clone());

    let found = repo.find_by_email("carol@example.com").await.unwrap();
    assert!(found.is_some());
    assert!(cache.has_id(1));
    assert!(cache.has_username("carol"));
}

#[tokio::test]
async fn should_drop_old_username_key_after_rename() {
    let user = test_user(1, "oldname", "carol@example.com", "password123");
    let cache = InMemoryUserCache::empty();
    let repo = cached(MockUserRepo::new(vec![user]), cache.clone());

    // Warm the cache under the old identity first.
    repo.find_by_username("oldname").await.unwrap().unwrap();
    assert!(cache.has_username("oldname"));

    let patch = UserPatch {
        username: Some("newname".to_owned()),
        ..Default::default()
    };
    let updated = repo.update(1, &patch).await.unwrap();
    assert_eq!(updated.username, "newname");

    // Old identity is gone from cache and store alike...
    assert!(!cache.has_username("oldname"));
    assert!(repo.find_by_username("oldname").await.unwrap().is_none());

    // ...while the new identity serves the updated record.
    let found = repo.find_by_username("newname").await.unwrap().unwrap();
    assert_eq!(found.id, 1);
    assert_eq!(found.username, "newname");
    assert!(cache.has_username("newname"));
    assert!(cache.has_id(1));
}

#[tokio::test]
async fn should_invalidate_cache_on_soft_delete() {
    let user = test_user(1, "carol", "carol@example.com", "password123");
    let cache = InMemoryUserCache::empty();
    let repo = cached(MockUserRepo::new(vec![user]), cache.clone());

    repo.find_by_id(1).await.unwrap().unwrap();
    assert!(cache.has_id(1));

    let deleted = repo.soft_delete(1).await.unwrap();
    assert!(deleted.deleted_at.is_some());

    assert!(!cache.has_id(1));
    assert!(!cache.has_username("carol"));
}

#[tokio::test]
async fn should_cache_created_user_under_both_keys() {
    let cache = InMemoryUserCache::empty();
    let store = MockUserRepo::empty();
    let repo = cached(store, cache.clone());

    let user = test_user(0, "carol", "carol@example.com", "password123");
    let created = repo
        .create(
            &savora_auth::domain::types::NewUser {
                first_name: user.first_name,
                last_name: user.last_name,
                username: user.username,
                email: user.email,
                password_hash: user.password_hash,
                is_super: false,
                roles: user.roles,
            },
            &Default::default(),
        )
        .await
        .unwrap();

    assert!(cache.has_id(created.id));
    assert!(cache.has_username("carol"));
}

#[tokio::test]
async fn should_serve_stale_entry_until_invalidated() {
    // No TTL exists; staleness is bounded only by explicit invalidation.
    let store_user = test_user(1, "carol", "carol@example.com", "password123");
    let mut stale = store_user.clone();
    stale.first_name = "Stale".to_owned();

    let cache = InMemoryUserCache::empty();
    cache.seed(&stale);
    let repo = cached(MockUserRepo::new(vec![store_user]), cache);

    let found = repo.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(found.first_name, "Stale");
}

#[tokio::test]
async fn should_degrade_to_store_when_cache_fails() {
    let user = test_user(1, "carol", "carol@example.com", "password123");
    let repo = CachedUserRepository {
        store: MockUserRepo::new(vec![user]),
        cache: FailingUserCache,
    };

    // Reads fall through to the store; writes ignore the broken cache.
    let found = repo.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(found.id, 1);

    let patch = UserPatch {
        first_name: Some("Updated".to_owned()),
        ..Default::default()
    };
    let updated = repo.update(1, &patch).await.unwrap();
    assert_eq!(updated.first_name, "Updated");
}
