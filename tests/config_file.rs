// tests/config_file.rs
use bank_sentiment_client::config::ClientConfig;
use bank_sentiment_client::Language;
use std::fs;

#[test]
fn shipped_config_parses() {
    let cfg: ClientConfig = toml::from_str(include_str!("../config/client.toml")).unwrap();
    let cfg = cfg.sanitized().unwrap();
    assert_eq!(cfg.fallback_variant().unwrap().name, "basic");
    assert!(cfg.variant("extended").unwrap().supports_limit);
    assert_eq!(cfg.languages, vec![Language::All, Language::En, Language::Pt]);
}

#[test]
fn load_from_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("client.toml");
    fs::write(
        &p_toml,
        r#"
base_url = "https://sentiment.example.com/api/"
error_display_ms = 5000
languages = ["en"]

[[variants]]
name = "vader"
path = "analyze/vader/"
"#,
    )
    .unwrap();
    let t = ClientConfig::load_from(&p_toml).unwrap();
    assert_eq!(t.error_display_ms, 5000);
    assert_eq!(t.languages, vec![Language::En]);
    assert_eq!(
        t.endpoint_url(t.fallback_variant().unwrap()),
        "https://sentiment.example.com/api/analyze/vader/"
    );

    let p_json = dir.path().join("client.json");
    fs::write(
        &p_json,
        r#"{"base_url": "http://10.0.0.5:8000", "default_variant": "extended"}"#,
    )
    .unwrap();
    let j = ClientConfig::load_from(&p_json).unwrap();
    assert_eq!(j.fallback_variant().unwrap().name, "extended");
    assert_eq!(j.timeout_ms, 30_000);
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("client.toml");
    fs::write(&p, "timeout_ms = \"soon\"").unwrap();
    let err = ClientConfig::load_from(&p).unwrap_err();
    assert!(format!("{err:#}").contains("parsing TOML config"));
}
