use super::client::{ChannelClient, ChannelEvent};
use crate::protocol::{ClientMessage, ServerMessage};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Reconnection backoff for the channel transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for the doubling delay
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(5000),
        }
    }
}

impl ReconnectPolicy {
    /// Delay to wait after `delay`
    pub fn next_delay(&self, delay: Duration) -> Duration {
        (delay * 2).min(self.max_delay)
    }
}

impl ChannelClient {
    /// Open a channel to `endpoint` and keep it connected until `close()`
    pub fn connect(endpoint: &str, policy: ReconnectPolicy, error_display: Duration) -> Self {
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let client = ChannelClient::new(outgoing_tx, error_display);

        let shutdown = client.shutdown_signal();
        client.set_transport_active(true);
        tokio::spawn(run_transport(
            client.clone(),
            endpoint.to_string(),
            policy,
            outgoing_rx,
            shutdown,
        ));

        client
    }
}

async fn run_transport(
    client: ChannelClient,
    endpoint: String,
    policy: ReconnectPolicy,
    mut outgoing: mpsc::UnboundedReceiver<ClientMessage>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut delay = policy.initial_delay;

    while !*shutdown.borrow() {
        match connect_async(endpoint.as_str()).await {
            Ok((stream, _)) => {
                delay = policy.initial_delay;

                // Anything queued while disconnected is dropped, not replayed
                while outgoing.try_recv().is_ok() {}
                client.handle_event(ChannelEvent::Connected);

                let (mut sink, mut source) = stream.split();

                loop {
                    tokio::select! {
                        _ = shutdown.changed() => {
                            let _ = sink.close().await;
                            break;
                        }
                        Some(message) = outgoing.recv() => {
                            let frame = match message.encode() {
                                Ok(frame) => frame,
                                Err(e) => {
                                    error!("Failed to encode request: {}", e);
                                    continue;
                                }
                            };
                            if let Err(e) = sink.send(Message::Text(frame)).await {
                                warn!("Failed to send request: {}", e);
                                break;
                            }
                        }
                        incoming = source.next() => match incoming {
                            Some(Ok(Message::Text(text))) => match ServerMessage::decode(&text) {
                                Ok(message) => client.handle_event(ChannelEvent::Message(message)),
                                Err(e) => warn!("Ignoring frame from relay: {:#}", e),
                            },
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Ok(other)) => debug!("Ignoring non-text frame: {:?}", other),
                            Some(Err(e)) => {
                                warn!("Channel error: {}", e);
                                break;
                            }
                        },
                    }
                }

                client.handle_event(ChannelEvent::Disconnected);
            }
            Err(e) => {
                debug!("Connecting to {} failed: {}", endpoint, e);
            }
        }

        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.changed() => break,
        }
        delay = policy.next_delay(delay);
    }

    info!("Channel to {} closed", endpoint);
    client.set_transport_active(false);
}
