use crate::protocol::{ClientMessage, ServerMessage, TranslationRequest, TranslationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// How long a received error stays in `last_error`
pub const ERROR_DISPLAY_DURATION: Duration = Duration::from_secs(5);

/// A translation as kept in the session log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub original: String,
    pub translated: String,
    /// When the client received it
    pub received_at: DateTime<Utc>,
}

impl From<TranslationResult> for TranslationRecord {
    fn from(result: TranslationResult) -> Self {
        Self {
            original: result.original,
            translated: result.translated,
            received_at: Utc::now(),
        }
    }
}

/// Signals delivered by the channel transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Connected,
    Disconnected,
    Message(ServerMessage),
}

/// Client side of the translation channel.
///
/// Reflects connection state, keeps the received translations newest first
/// and shows the latest error for a fixed period. Cloning yields another
/// handle to the same session.
#[derive(Clone)]
pub struct ChannelClient {
    inner: Arc<Inner>,
}

struct Inner {
    connected: watch::Sender<bool>,
    translations: watch::Sender<Vec<TranslationRecord>>,
    last_error: watch::Sender<Option<String>>,
    outgoing: mpsc::UnboundedSender<ClientMessage>,
    error_display: Duration,
    /// At most one pending clear of `last_error`
    error_timer: Mutex<Option<JoinHandle<()>>>,
    /// Bumped per error so a superseded timer never clears a newer message
    error_generation: AtomicU64,
    shutdown: watch::Sender<bool>,
    /// Whether a transport task is still driving this client
    transport_active: watch::Sender<bool>,
}

impl ChannelClient {
    /// Create a detached client whose sent frames land in `outgoing`.
    ///
    /// `connect` wires this to a real WebSocket; tests drive it directly
    /// through `handle_event`.
    pub fn new(outgoing: mpsc::UnboundedSender<ClientMessage>, error_display: Duration) -> Self {
        let (connected, _) = watch::channel(false);
        let (translations, _) = watch::channel(Vec::new());
        let (last_error, _) = watch::channel(None);
        let (shutdown, _) = watch::channel(false);
        let (transport_active, _) = watch::channel(false);

        Self {
            inner: Arc::new(Inner {
                connected,
                translations,
                last_error,
                outgoing,
                error_display,
                error_timer: Mutex::new(None),
                error_generation: AtomicU64::new(0),
                shutdown,
                transport_active,
            }),
        }
    }

    /// Send a translation request if connected; otherwise drop it.
    ///
    /// Returns whether the request was handed to the channel.
    pub fn translate(&self, text: &str, target_language: &str) -> bool {
        if !self.is_connected() {
            debug!("Not connected, dropping translation request");
            return false;
        }

        let message = ClientMessage::Translate(TranslationRequest::new(text, target_language));
        self.inner.outgoing.send(message).is_ok()
    }

    /// Apply a transport signal to the observable state
    pub fn handle_event(&self, event: ChannelEvent) {
        match event {
            ChannelEvent::Connected => {
                info!("Connected to server");
                self.inner.connected.send_replace(true);
                self.cancel_error_timer();
                self.inner.last_error.send_replace(None);
            }
            ChannelEvent::Disconnected => {
                info!("Disconnected from server");
                self.inner.connected.send_replace(false);
            }
            ChannelEvent::Message(ServerMessage::Translation(result)) => {
                let record = TranslationRecord::from(result);
                self.inner
                    .translations
                    .send_modify(|log| log.insert(0, record));
            }
            ChannelEvent::Message(ServerMessage::Error(event)) => {
                error!("Error: {}", event.message);
                self.show_error(event.message);
            }
        }
    }

    fn show_error(&self, message: String) {
        let generation = self.inner.error_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.last_error.send_replace(Some(message));

        let inner = Arc::clone(&self.inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(inner.error_display).await;
            inner.last_error.send_if_modified(|current| {
                if inner.error_generation.load(Ordering::SeqCst) != generation {
                    return false;
                }
                current.take().is_some()
            });
        });

        let mut slot = self
            .inner
            .error_timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = slot.replace(timer) {
            previous.abort();
        }
    }

    fn cancel_error_timer(&self) {
        let mut slot = self
            .inner
            .error_timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(timer) = slot.take() {
            timer.abort();
        }
    }

    pub fn is_connected(&self) -> bool {
        *self.inner.connected.borrow()
    }

    /// Snapshot of the log, most recent first
    pub fn translations(&self) -> Vec<TranslationRecord> {
        self.inner.translations.borrow().clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error.borrow().clone()
    }

    pub fn subscribe_connected(&self) -> watch::Receiver<bool> {
        self.inner.connected.subscribe()
    }

    pub fn subscribe_translations(&self) -> watch::Receiver<Vec<TranslationRecord>> {
        self.inner.translations.subscribe()
    }

    pub fn subscribe_error(&self) -> watch::Receiver<Option<String>> {
        self.inner.last_error.subscribe()
    }

    /// Close the channel. Safe to call more than once.
    pub fn close(&self) {
        self.inner.shutdown.send_replace(true);
        self.cancel_error_timer();
        self.inner.connected.send_replace(false);
    }

    /// Wait until the transport, if any, has shut down after `close()`
    pub async fn closed(&self) {
        let mut active = self.inner.transport_active.subscribe();
        let _ = active.wait_for(|active| !*active).await;
    }

    pub(crate) fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.inner.shutdown.subscribe()
    }

    pub(crate) fn set_transport_active(&self, active: bool) {
        self.inner.transport_active.send_replace(active);
    }
}

impl crate::recognition::TranslationSink for ChannelClient {
    fn translate(&self, text: &str, target_language: &str) {
        ChannelClient::translate(self, text, target_language);
    }
}
