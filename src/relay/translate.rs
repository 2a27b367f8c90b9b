use crate::completion::{translation_instruction, CompletionProvider, CompletionRequest};
use crate::protocol::{ErrorEvent, ServerMessage, TranslationRequest, TranslationResult};
use std::sync::Arc;
use tracing::{debug, error};

/// Language used when a request names none
pub const DEFAULT_TARGET_LANGUAGE: &str = "Spanish";

/// Forwards translation requests to the completion service.
///
/// Holds no per-request state: every call is one independent completion
/// attempt with no retry.
pub struct TranslationRelay {
    provider: Arc<dyn CompletionProvider>,
}

impl TranslationRelay {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Handle one request.
    ///
    /// Returns `None` for requests without text, otherwise exactly one
    /// `translation` or `error` reply.
    pub async fn handle(&self, request: TranslationRequest) -> Option<ServerMessage> {
        let TranslationRequest {
            text,
            target_language,
            id,
        } = request;

        let text = match text {
            Some(text) if !text.is_empty() => text,
            _ => {
                debug!("Dropping translation request without text");
                return None;
            }
        };

        let target_language = target_language
            .filter(|language| !language.is_empty())
            .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_string());

        let completion = CompletionRequest {
            system_instruction: translation_instruction(&target_language),
            user_text: text.clone(),
        };

        let reply = match self.provider.complete(&completion).await {
            Ok(translated) => ServerMessage::Translation(TranslationResult {
                original: text,
                translated,
                id,
            }),
            Err(e) => {
                error!("Translation error: {}", e);
                ServerMessage::Error(ErrorEvent {
                    message: format!("Translation failed: {}", e),
                    id,
                })
            }
        };

        Some(reply)
    }
}
