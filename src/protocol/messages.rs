use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Translation request sent by the client (`translate` event)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    /// Text to translate; absent or empty requests are dropped by the relay
    #[serde(default)]
    pub text: Option<String>,

    /// Defaults to Spanish on the relay when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,

    /// Optional correlation token, echoed back on the reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            target_language: Some(target_language.into()),
            id: None,
        }
    }
}

/// Successful translation (`translation` event)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub original: String,
    pub translated: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Failure report (`error` event)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Client → relay frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    Translate(TranslationRequest),
}

/// Relay → client frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    Translation(TranslationResult),
    Error(ErrorEvent),
}

impl ClientMessage {
    pub fn decode(frame: &str) -> Result<Self> {
        serde_json::from_str(frame).context("Malformed client frame")
    }

    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to encode client frame")
    }
}

impl ServerMessage {
    pub fn decode(frame: &str) -> Result<Self> {
        serde_json::from_str(frame).context("Malformed server frame")
    }

    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to encode server frame")
    }
}
