use super::{apply_env, apply_file, load_settings, normalize_server_url, Settings};

use std::{
    collections::HashMap,
    env, fs,
    path::PathBuf,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use shared::domain::LlmProvider;

fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn defaults_match_the_controller_timings() {
    let settings = Settings::default();
    assert_eq!(settings.debounce(), Duration::from_millis(400));
    assert_eq!(settings.notice_ttl(), Duration::from_millis(3000));
    assert_eq!(settings.request_timeout(), None);
    assert_eq!(settings.llm_provider, LlmProvider::Openai);
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
server_url = "http://analytics.internal:9000"
llm_provider = "anthropic"
debounce_ms = 250
request_timeout_secs = 30
download_dir = "exports"
"#,
    )
    .expect("valid file");

    assert_eq!(settings.server_url, "http://analytics.internal:9000");
    assert_eq!(settings.llm_provider, LlmProvider::Anthropic);
    assert_eq!(settings.debounce_ms, 250);
    assert_eq!(settings.notice_ms, 3000);
    assert_eq!(settings.request_timeout(), Some(Duration::from_secs(30)));
    assert_eq!(settings.download_dir, PathBuf::from("exports"));
}

#[test]
fn malformed_file_is_an_error() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "debounce_ms = \"soon\"").is_err());
    assert!(apply_file(&mut settings, "llm_provider = \"mystery\"").is_err());
}

#[test]
fn app_prefix_wins_over_querydesk_prefix() {
    let vars = env_of(&[
        ("QUERYDESK_SERVER_URL", "http://a:1"),
        ("APP__SERVER_URL", "http://b:2"),
        ("QUERYDESK_NOTICE_MS", "1500"),
        ("APP__DEBOUNCE_MS", "not-a-number"),
    ]);
    let mut settings = Settings::default();

    apply_env(&mut settings, |key| vars.get(key).cloned());

    assert_eq!(settings.server_url, "http://b:2");
    assert_eq!(settings.notice_ms, 1500);
    assert_eq!(settings.debounce_ms, 400);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("querydesk_missing_{suffix}.toml"));

    let settings = load_settings(&path).expect("defaults");
    assert_eq!(settings.debounce_ms, 400);
}

#[test]
fn load_settings_reads_the_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("querydesk_test_{suffix}.toml"));
    fs::write(&path, "notice_ms = 5000\n").expect("write config");

    let settings = load_settings(&path).expect("load");
    assert_eq!(settings.notice_ttl(), Duration::from_secs(5));

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn server_url_is_normalized() {
    assert_eq!(
        normalize_server_url("http://localhost:8000/").expect("url"),
        "http://localhost:8000"
    );
    assert_eq!(
        normalize_server_url("localhost:8000").expect("url"),
        "http://localhost:8000"
    );
    assert_eq!(
        normalize_server_url("  ").expect("url"),
        "http://127.0.0.1:8000"
    );
    assert!(normalize_server_url("ftp://files.example.com").is_err());
}
