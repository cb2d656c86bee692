use std::sync::Arc;

use time::{Duration, OffsetDateTime, macros::datetime};

use passport_auth::prelude::*;
use passport_auth::token::FixedClock;
use passport_auth_memory::InMemoryTokenStore;

const NOW: OffsetDateTime = datetime!(2025-01-01 12:00 UTC);

fn manager() -> TokenLifecycleManager {
    TokenLifecycleManager::new(Arc::new(InMemoryTokenStore::new()))
        .with_clock(Arc::new(FixedClock(NOW)))
}

fn client() -> Client {
    Client::new("app", "https://app.example/cb")
}

async fn issue(manager: &TokenLifecycleManager, id: &str, expires_at: OffsetDateTime) {
    manager
        .create(NewAccessToken::new(Some("user-1".to_string()), "app", expires_at).with_id(id))
        .await
        .unwrap();
}

#[tokio::test]
async fn find_valid_token_returns_freshest_grant() {
    let manager = manager();
    issue(&manager, "a", NOW + Duration::hours(1)).await;
    issue(&manager, "b", NOW + Duration::hours(3)).await;
    issue(&manager, "c", NOW + Duration::hours(2)).await;

    let token = manager
        .find_valid_token("user-1", &client())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(token.id, "b");

    manager.revoke("b").await.unwrap();
    let token = manager
        .find_valid_token("user-1", &client())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(token.id, "c");
}

#[tokio::test]
async fn exact_expiry_instant_is_invalid() {
    let manager = manager();
    issue(&manager, "edge", NOW).await;

    assert!(
        manager
            .get_valid_token("user-1", &client())
            .await
            .unwrap()
            .is_none()
    );
    assert!(!manager.is_revoked("edge").await.unwrap());
}

#[tokio::test]
async fn revoke_twice_matches_revoke_once() {
    let manager = manager();
    issue(&manager, "t1", NOW + Duration::hours(1)).await;

    manager.revoke("t1").await.unwrap();
    let once = manager.find("t1").await.unwrap();
    manager.revoke("t1").await.unwrap();
    let twice = manager.find("t1").await.unwrap();

    assert_eq!(once, twice);
    assert!(manager.revoke("unknown").await.is_ok());
    assert!(manager.is_revoked("unknown").await.unwrap());
}

#[tokio::test]
async fn for_user_lists_every_token() {
    let manager = manager();
    issue(&manager, "live", NOW + Duration::hours(1)).await;
    issue(&manager, "expired", NOW - Duration::hours(1)).await;

    let tokens = manager.for_user("user-1").await.unwrap();
    assert_eq!(tokens.len(), 2);
    assert!(manager.for_user("user-2").await.unwrap().is_empty());
    assert!(manager.find_for_user("live", "user-2").await.unwrap().is_none());
}

#[tokio::test]
async fn stale_save_after_revoke_stays_revoked() {
    let manager = manager();
    issue(&manager, "t1", NOW + Duration::hours(1)).await;
    let mut stale = manager.find("t1").await.unwrap().unwrap();

    manager.revoke("t1").await.unwrap();
    stale.scopes = vec!["read".to_string()];
    manager.save(&mut stale).await.unwrap();

    assert!(stale.revoked);
    assert!(manager.is_revoked("t1").await.unwrap());
    assert!(
        manager
            .find_valid_token("user-1", &client())
            .await
            .unwrap()
            .is_none()
    );
    let stored = manager.find("t1").await.unwrap().unwrap();
    assert_eq!(stored.scopes, vec!["read".to_string()]);
}
