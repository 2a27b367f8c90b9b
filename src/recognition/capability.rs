use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recognition settings handed to a capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Keep listening across utterances
    pub continuous: bool,
    /// Emit interim (non-final) transcripts
    pub interim_results: bool,
    /// BCP-47 language tag
    pub language: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            continuous: true,
            interim_results: true,
            language: "en-US".to_string(),
        }
    }
}

/// Best transcript for one result slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEvent {
    pub text: String,
    pub is_final: bool,
    pub sequence_index: usize,
}

/// Full view of a capability session's results.
///
/// `events[i]` is the latest transcript for index `i`; slots from
/// `result_index` on changed in this batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptBatch {
    pub result_index: usize,
    pub events: Vec<TranscriptEvent>,
}

impl TranscriptBatch {
    /// Slots changed by this batch
    pub fn changed(&self) -> &[TranscriptEvent] {
        self.events.get(self.result_index..).unwrap_or(&[])
    }

    /// Latest text of every slot joined in index order
    pub fn full_transcript(&self) -> String {
        self.events.iter().map(|event| event.text.as_str()).collect()
    }
}

/// Why a capability reported an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecognitionErrorKind {
    /// Microphone permission denied
    NotAllowed,
    NoSpeech,
    Aborted,
    AudioCapture,
    Network,
    #[serde(untagged)]
    Other(String),
}

impl RecognitionErrorKind {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::NotAllowed)
    }
}

impl fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAllowed => f.write_str("not-allowed"),
            Self::NoSpeech => f.write_str("no-speech"),
            Self::Aborted => f.write_str("aborted"),
            Self::AudioCapture => f.write_str("audio-capture"),
            Self::Network => f.write_str("network"),
            Self::Other(kind) => f.write_str(kind),
        }
    }
}

/// Events emitted by a running capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityEvent {
    /// The capability began listening
    Started,
    Result(TranscriptBatch),
    /// The capability stopped emitting (silence timeout, stop, error)
    End,
    Error(RecognitionErrorKind),
}

/// Speech recognition provider
///
/// Events are delivered out of band (see `CapabilityEvent`); the controller
/// only starts and stops it.
pub trait RecognitionCapability: Send {
    /// Apply recognition settings before the first start
    fn configure(&mut self, _config: &RecognitionConfig) {}

    /// Begin a recognition session; fails if one is already running
    fn start(&mut self) -> Result<()>;

    /// End the current session; a no-op when idle
    fn stop(&mut self) -> Result<()>;

    /// Capability name for logging
    fn name(&self) -> &str;
}

/// Where finalized chunks go for translation
pub trait TranslationSink {
    fn translate(&self, text: &str, target_language: &str);
}
