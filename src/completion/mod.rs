//! External text-completion service
//!
//! The relay only needs one call shape: a system instruction plus the user's
//! text in, the completion text out. `GroqClient` speaks the OpenAI-compatible
//! chat completions API; tests substitute their own `CompletionProvider`.

mod groq;

pub use groq::GroqClient;

use anyhow::Result;

/// One completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system_instruction: String,
    pub user_text: String,
}

/// Completion service seam
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run a single completion and return the first choice's text
    /// (empty when the service returned no content)
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Instruction sent with every translation request
pub fn translation_instruction(target_language: &str) -> String {
    format!(
        "You are a professional translator. Translate the following English text to {}. \
         Provide ONLY the translated text. Do not add any explanations or quotes.",
        target_language
    )
}
