pub mod channel;
pub mod completion;
pub mod config;
pub mod protocol;
pub mod recognition;
pub mod relay;

pub use channel::{ChannelClient, ChannelEvent, ReconnectPolicy, TranslationRecord};
pub use completion::{CompletionProvider, CompletionRequest, GroqClient};
pub use config::Config;
pub use protocol::{ClientMessage, ErrorEvent, ServerMessage, TranslationRequest, TranslationResult};
pub use recognition::{
    CapabilityEvent, LineRecognizer, RecognitionCapability, RecognitionController,
    TranscriptBatch, TranscriptEvent, TranslationSink,
};
pub use relay::{create_router, AppState, TranslationRelay};
