pub mod messages;

pub use messages::{ClientMessage, ErrorEvent, ServerMessage, TranslationRequest, TranslationResult};
