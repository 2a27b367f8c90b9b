use super::capability::{
    CapabilityEvent, RecognitionCapability, RecognitionConfig, RecognitionErrorKind,
    TranscriptBatch, TranslationSink,
};
use std::collections::BTreeSet;
use std::future::Future;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Notice shown when the microphone is blocked
pub const PERMISSION_DENIED_NOTICE: &str = "Microphone access blocked.";

/// Lifecycle of the owned capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityPhase {
    Idle,
    Starting,
    Listening,
    Stopping,
}

/// Drives a recognition capability for continuous listening.
///
/// Tracks the user's recording intent separately from the capability's own
/// lifecycle, restarts the capability whenever it ends while recording is
/// still wanted, and sends each newly finalized chunk for translation.
pub struct RecognitionController<C, T> {
    capability: C,
    sink: T,
    target_language: String,

    phase: CapabilityPhase,
    desired_recording: bool,
    /// Indices already sent for translation in the current capability session
    finalized: BTreeSet<usize>,

    is_recording: watch::Sender<bool>,
    live_transcript: watch::Sender<String>,
    notice: watch::Sender<Option<String>>,
}

impl<C, T> RecognitionController<C, T>
where
    C: RecognitionCapability,
    T: TranslationSink,
{
    pub fn new(mut capability: C, sink: T, target_language: impl Into<String>) -> Self {
        capability.configure(&RecognitionConfig::default());

        let (is_recording, _) = watch::channel(false);
        let (live_transcript, _) = watch::channel(String::new());
        let (notice, _) = watch::channel(None);

        Self {
            capability,
            sink,
            target_language: target_language.into(),
            phase: CapabilityPhase::Idle,
            desired_recording: false,
            finalized: BTreeSet::new(),
            is_recording,
            live_transcript,
            notice,
        }
    }

    /// Flip recording on or off
    pub fn toggle(&mut self) {
        if self.desired_recording {
            self.desired_recording = false;
            self.is_recording.send_replace(false);
            self.stop_capability();
        } else {
            self.desired_recording = true;
            self.is_recording.send_replace(true);
            self.live_transcript.send_replace(String::new());
            if let Err(e) = self.start_capability() {
                // Recording intent stays on; the next end/toggle decides
                error!("Could not start recording: {:#}", e);
            }
        }
    }

    pub fn handle_event(&mut self, event: CapabilityEvent) {
        match event {
            CapabilityEvent::Started => self.on_started(),
            CapabilityEvent::Result(batch) => self.on_transcript(&batch),
            CapabilityEvent::End => self.on_end(),
            CapabilityEvent::Error(kind) => self.on_error(kind),
        }
    }

    fn on_started(&mut self) {
        if self.phase == CapabilityPhase::Starting {
            self.phase = CapabilityPhase::Listening;
        }
        debug!("{} listening", self.capability.name());
    }

    fn on_transcript(&mut self, batch: &TranscriptBatch) {
        self.live_transcript.send_replace(batch.full_transcript());

        for event in batch.changed() {
            if event.is_final && self.finalized.insert(event.sequence_index) {
                self.sink.translate(&event.text, &self.target_language);
            }
        }
    }

    fn on_end(&mut self) {
        self.phase = CapabilityPhase::Idle;

        if self.desired_recording {
            // Silence or a dropped session; resume listening
            if let Err(e) = self.start_capability() {
                warn!("Restarting {} failed: {:#}", self.capability.name(), e);
            }
        } else {
            self.is_recording.send_replace(false);
        }
    }

    fn on_error(&mut self, kind: RecognitionErrorKind) {
        error!("Speech recognition error: {}", kind);

        if kind.is_permission_denied() {
            self.desired_recording = false;
            self.is_recording.send_replace(false);
            self.notice
                .send_replace(Some(PERMISSION_DENIED_NOTICE.to_string()));
        }
    }

    /// Start only from `Idle`; any other phase already has a live session
    fn start_capability(&mut self) -> anyhow::Result<()> {
        if self.phase != CapabilityPhase::Idle {
            debug!("Ignoring start while {:?}", self.phase);
            return Ok(());
        }

        self.phase = CapabilityPhase::Starting;
        self.finalized.clear();

        if let Err(e) = self.capability.start() {
            self.phase = CapabilityPhase::Idle;
            return Err(e);
        }

        Ok(())
    }

    fn stop_capability(&mut self) {
        match self.phase {
            CapabilityPhase::Starting | CapabilityPhase::Listening => {
                self.phase = CapabilityPhase::Stopping;
                if let Err(e) = self.capability.stop() {
                    warn!("Stopping {} failed: {:#}", self.capability.name(), e);
                }
            }
            CapabilityPhase::Idle | CapabilityPhase::Stopping => {}
        }
    }

    /// End the session: drop the recording intent and stop unconditionally
    pub fn shutdown(&mut self) {
        self.desired_recording = false;
        if self.phase != CapabilityPhase::Idle {
            self.phase = CapabilityPhase::Stopping;
        }
        if let Err(e) = self.capability.stop() {
            debug!("Stop during shutdown failed: {:#}", e);
        }
    }

    /// Start recording, feed capability events until `shutdown` resolves or
    /// the event stream ends, then tear down.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<CapabilityEvent>,
        shutdown: impl Future<Output = ()>,
    ) -> Self {
        tokio::pin!(shutdown);

        info!("Recognition session started ({})", self.capability.name());
        self.toggle();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                _ = &mut shutdown => break,
            }
        }

        self.shutdown();
        info!("Recognition session ended");
        self
    }

    pub fn phase(&self) -> CapabilityPhase {
        self.phase
    }

    pub fn desired_recording(&self) -> bool {
        self.desired_recording
    }

    pub fn is_recording(&self) -> bool {
        *self.is_recording.borrow()
    }

    pub fn live_transcript(&self) -> String {
        self.live_transcript.borrow().clone()
    }

    pub fn notice(&self) -> Option<String> {
        self.notice.borrow().clone()
    }

    pub fn subscribe_recording(&self) -> watch::Receiver<bool> {
        self.is_recording.subscribe()
    }

    pub fn subscribe_transcript(&self) -> watch::Receiver<String> {
        self.live_transcript.subscribe()
    }

    pub fn subscribe_notice(&self) -> watch::Receiver<Option<String>> {
        self.notice.subscribe()
    }
}
