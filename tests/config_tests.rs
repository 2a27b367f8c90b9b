use anyhow::Result;
use live_translator::Config;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_defaults_without_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let missing = temp_dir.path().join("absent");

    let cfg = Config::load(missing.to_str().unwrap())?;

    assert_eq!(cfg.service.http.port, 3001);
    assert_eq!(
        cfg.service.allowed_origins,
        vec!["http://localhost:5173", "http://localhost:5174"]
    );
    assert_eq!(cfg.completion.model, "llama-3.3-70b-versatile");
    assert_eq!(cfg.completion.base_url, "https://api.groq.com/openai/v1");
    assert_eq!(cfg.completion.api_key_env, "GROQ_API_KEY");
    assert_eq!(cfg.client.target_language, "Spanish");
    assert_eq!(cfg.client.error_display_secs, 5);
    assert_eq!(cfg.bind_addr(), "0.0.0.0:3001");

    Ok(())
}

#[test]
fn test_file_overrides_defaults() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("translator.toml");
    fs::write(
        &path,
        r#"
[service.http]
bind = "127.0.0.1"
port = 4100

[completion]
model = "llama-3.1-8b-instant"
api_key_env = "LIVE_TRANSLATOR_TEST_UNSET_KEY"

[client]
target_language = "French"
"#,
    )?;

    let cfg = Config::load(path.to_str().unwrap())?;

    assert_eq!(cfg.bind_addr(), "127.0.0.1:4100");
    assert_eq!(cfg.completion.model, "llama-3.1-8b-instant");
    assert_eq!(cfg.completion.api_key, None, "Unset key variable leaves no credential");
    assert_eq!(cfg.client.target_language, "French");
    // Untouched sections keep their defaults
    assert_eq!(cfg.service.allowed_origins.len(), 2);
    assert_eq!(cfg.client.endpoint, "ws://localhost:3001/ws");

    Ok(())
}

#[test]
fn test_api_key_is_read_from_named_variable() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("translator.toml");
    fs::write(
        &path,
        r#"
[completion]
api_key_env = "LIVE_TRANSLATOR_TEST_KEY"
"#,
    )?;

    std::env::set_var("LIVE_TRANSLATOR_TEST_KEY", "gsk-test");
    let cfg = Config::load(path.to_str().unwrap())?;
    std::env::remove_var("LIVE_TRANSLATOR_TEST_KEY");

    assert_eq!(cfg.completion.api_key.as_deref(), Some("gsk-test"));
    Ok(())
}
