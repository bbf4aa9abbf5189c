use super::*;

use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_point_at_local_backend() {
    let settings = Settings::default();
    assert_eq!(settings.api_origin, "https://127.0.0.1:8000");
    assert!(settings.store_url.starts_with("sqlite://"));
    assert!(settings.store_url.ends_with("fighters/session.db"));
    assert!(!settings.accept_invalid_certs);
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
        api_origin = "https://fighters.example.com"
        accept_invalid_certs = true
        request_timeout_secs = 3
        "#,
    )
    .expect("apply file");

    assert_eq!(settings.api_origin, "https://fighters.example.com");
    assert!(settings.accept_invalid_certs);
    assert_eq!(settings.request_timeout_secs, 3);
    assert_eq!(settings.store_url, Settings::default().store_url);
}

#[test]
fn unknown_file_keys_are_rejected() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "api_orgin = \"typo\"").is_err());
}

#[test]
fn env_overrides_file_values() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "api_origin = \"https://from-file\"").expect("apply file");
    apply_env_overrides(
        &mut settings,
        env(&[
            ("APP__API_ORIGIN", "https://from-env"),
            ("APP__STORE_URL", "sqlite::memory:"),
            ("APP__ACCEPT_INVALID_CERTS", "yes"),
        ]),
    );

    assert_eq!(settings.api_origin, "https://from-env");
    assert_eq!(settings.store_url, "sqlite::memory:");
    assert!(settings.accept_invalid_certs);
}

#[test]
fn invalid_env_values_are_ignored() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env(&[
            ("APP__ACCEPT_INVALID_CERTS", "maybe"),
            ("APP__REQUEST_TIMEOUT_SECS", "soon"),
        ]),
    );
    assert_eq!(settings, Settings::default());
}

#[test]
fn zero_timeout_disables_request_timeout() {
    let settings = Settings {
        request_timeout_secs: 0,
        ..Settings::default()
    };
    assert_eq!(settings.http_options().timeout, None);
    assert_eq!(
        Settings::default().http_options().timeout,
        Some(Duration::from_secs(10))
    );
}

#[test]
fn explicit_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent.toml");
    assert!(load_settings(Some(&missing)).is_err());
}

#[test]
fn explicit_config_file_is_loaded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("client.toml");
    fs::write(&path, "store_url = \"sqlite::memory:\"\n").expect("write config");

    let settings = load_settings(Some(&path)).expect("load");
    assert!(settings.store_url == "sqlite::memory:" || std::env::var("APP__STORE_URL").is_ok());
}
