use super::*;

#[tokio::test]
async fn set_then_get_roundtrips_value() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.set("jwtToken", "abc.def.ghi").await.expect("set");
    assert_eq!(
        storage.get("jwtToken").await.expect("get").as_deref(),
        Some("abc.def.ghi")
    );
}

#[tokio::test]
async fn missing_key_reads_as_none() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.get("jwtToken").await.expect("get"), None);
}

#[tokio::test]
async fn set_overwrites_existing_value() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.set("jwtToken", "old").await.expect("set old");
    storage.set("jwtToken", "new").await.expect("set new");
    assert_eq!(
        storage.get("jwtToken").await.expect("get").as_deref(),
        Some("new")
    );
}

#[tokio::test]
async fn remove_deletes_key_and_is_idempotent() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.set("jwtToken", "value").await.expect("set");
    storage.remove("jwtToken").await.expect("remove");
    storage.remove("jwtToken").await.expect("remove again");
    assert_eq!(storage.get("jwtToken").await.expect("get"), None);
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn health_check_fails_once_pool_is_closed() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.pool().close().await;
    storage
        .health_check()
        .await
        .expect_err("closed pool must not pass");
}

#[tokio::test]
async fn creates_database_file_and_persists_across_reopen() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("session.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    storage.set("jwtToken", "persisted").await.expect("set");
    storage.pool().close().await;
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    let reopened = Storage::new(&database_url).await.expect("reopen");
    assert_eq!(
        reopened.get("jwtToken").await.expect("get").as_deref(),
        Some("persisted")
    );
}

#[tokio::test]
async fn memory_store_behaves_like_a_map() {
    let store = MemoryStore::with_entry("jwtToken", "seed");
    assert_eq!(store.get("jwtToken").await.expect("get").as_deref(), Some("seed"));
    store.set("other", "x").await.expect("set");
    store.remove("jwtToken").await.expect("remove");
    assert_eq!(store.get("jwtToken").await.expect("get"), None);
    assert_eq!(store.get("other").await.expect("get").as_deref(), Some("x"));
}

#[test]
fn sqlite_path_ignores_memory_and_non_sqlite_urls() {
    assert_eq!(sqlite_path("sqlite::memory:"), None);
    assert_eq!(sqlite_path("postgres://localhost/db"), None);
    assert_eq!(
        sqlite_path("sqlite://./data/session.db?mode=rwc"),
        Some(PathBuf::from("./data/session.db"))
    );
}
