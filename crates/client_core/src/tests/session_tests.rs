use super::*;
use anyhow::anyhow;
use async_trait::async_trait;
use storage::MemoryStore;

struct UnavailableStore;

#[async_trait]
impl KeyValueStore for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(anyhow!("storage is disabled"))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(anyhow!("storage is disabled"))
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        Err(anyhow!("storage is disabled"))
    }
}

#[tokio::test]
async fn resolves_authenticated_session_from_stored_token() {
    let accessor = SessionAccessor::new(Arc::new(MemoryStore::with_entry(
        TOKEN_STORAGE_KEY,
        "header.payload.signature",
    )));

    let session = accessor.resolve().await;
    assert!(session.is_authenticated());
    assert_eq!(
        session.token().map(BearerToken::as_str),
        Some("header.payload.signature")
    );
}

#[tokio::test]
async fn missing_token_resolves_anonymous() {
    let accessor = SessionAccessor::new(Arc::new(MemoryStore::new()));
    assert_eq!(accessor.resolve().await, Session::anonymous());
}

#[tokio::test]
async fn blank_token_resolves_anonymous() {
    let accessor = SessionAccessor::new(Arc::new(MemoryStore::with_entry(TOKEN_STORAGE_KEY, "  ")));
    assert!(!accessor.resolve().await.is_authenticated());
}

#[tokio::test]
async fn unavailable_storage_degrades_to_anonymous() {
    let accessor = SessionAccessor::new(Arc::new(UnavailableStore));
    assert_eq!(accessor.get_token().await, None);
    assert!(!accessor.resolve().await.is_authenticated());
}

#[tokio::test]
async fn explicit_writes_surface_storage_errors() {
    let accessor = SessionAccessor::new(Arc::new(UnavailableStore));
    let token = BearerToken::new("t").expect("token");
    assert!(accessor.store_token(&token).await.is_err());
    assert!(accessor.clear().await.is_err());
}

#[tokio::test]
async fn store_then_clear_round_trips_through_storage() {
    let accessor = SessionAccessor::new(Arc::new(MemoryStore::new()));
    let token = BearerToken::new(" fresh-token ").expect("token");
    accessor.store_token(&token).await.expect("store");
    assert_eq!(
        accessor.get_token().await.as_ref().map(BearerToken::as_str),
        Some("fresh-token")
    );

    accessor.clear().await.expect("clear");
    assert!(!accessor.resolve().await.is_authenticated());
}

#[test]
fn debug_output_never_contains_the_token() {
    let token = BearerToken::new("super-secret").expect("token");
    let rendered = format!("{:?}", Session::authenticated(token));
    assert!(!rendered.contains("super-secret"), "leaked: {rendered}");
}
