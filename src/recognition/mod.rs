//! Recognition session control
//!
//! This module provides:
//! - The capability seam (`RecognitionCapability`) and its event types
//! - `RecognitionController`, which keeps a capability listening and hands
//!   finalized chunks to a `TranslationSink`
//! - `LineRecognizer`, a text-input capability used by the CLI

mod capability;
mod controller;
mod line;

pub use capability::{
    CapabilityEvent, RecognitionCapability, RecognitionConfig, RecognitionErrorKind,
    TranscriptBatch, TranscriptEvent, TranslationSink,
};
pub use controller::{CapabilityPhase, RecognitionController, PERMISSION_DENIED_NOTICE};
pub use line::LineRecognizer;
