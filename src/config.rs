use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Process configuration, built once at startup and handed to constructors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub completion: CompletionConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
    /// Origins allowed to open the channel from a browser
    pub allowed_origins: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "live-translator".to_string(),
            http: HttpConfig::default(),
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:5174".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// OpenAI-compatible API root (without `/chat/completions`)
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Environment variable holding the API credential
    pub api_key_env: String,
    /// Resolved from `api_key_env` by `Config::load`
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            timeout_secs: 60,
            api_key_env: "GROQ_API_KEY".to_string(),
            api_key: None,
        }
    }
}

impl CompletionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Relay WebSocket endpoint
    pub endpoint: String,
    pub target_language: String,
    /// How long a received error stays visible
    pub error_display_secs: u64,
    /// Quiet period after which the line recognizer ends its session
    pub silence_timeout_secs: u64,
    pub reconnect_initial_ms: u64,
    pub reconnect_max_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:3001/ws".to_string(),
            target_language: "Spanish".to_string(),
            error_display_secs: 5,
            silence_timeout_secs: 10,
            reconnect_initial_ms: 1000,
            reconnect_max_ms: 5000,
        }
    }
}

impl Config {
    /// Load from an optional file at `path` (any extension `config` understands),
    /// then `TRANSLATOR_*` environment overrides, e.g. `TRANSLATOR_SERVICE__HTTP__PORT`.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("TRANSLATOR")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        let mut cfg: Config = settings
            .try_deserialize()
            .context("Invalid configuration")?;

        cfg.completion.api_key = std::env::var(&cfg.completion.api_key_env)
            .ok()
            .filter(|key| !key.is_empty());

        Ok(cfg)
    }

    /// Address the relay listens on
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.service.http.bind, self.service.http.port)
    }
}
