use super::capability::{
    CapabilityEvent, RecognitionCapability, RecognitionConfig, TranscriptBatch, TranscriptEvent,
};
use anyhow::{bail, Result};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

/// Text-input recognizer: every non-empty line is a finalized transcript.
///
/// A session ends after `silence_timeout` without input, on `stop()`, or
/// when the input closes. Once the input is exhausted further starts fail
/// and the event sender is released so the consumer sees the stream end.
pub struct LineRecognizer {
    lines: Arc<Mutex<mpsc::Receiver<String>>>,
    events: Option<mpsc::UnboundedSender<CapabilityEvent>>,
    silence_timeout: Duration,
    exhausted: Arc<AtomicBool>,
    /// Cleared by the session task before it reports `End`
    running: Arc<AtomicBool>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl LineRecognizer {
    /// Read lines from `reader` on a background task
    pub fn new<R>(
        reader: R,
        events: mpsc::UnboundedSender<CapabilityEvent>,
        silence_timeout: Duration,
    ) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (line_tx, line_rx) = mpsc::channel(16);

        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line_tx.send(line).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Failed to read input: {}", e);
                        break;
                    }
                }
            }
        });

        Self::from_lines(line_rx, events, silence_timeout)
    }

    /// Read the process's standard input.
    ///
    /// Reads happen on a plain thread so a pending read never holds up
    /// runtime shutdown.
    pub fn stdin(events: mpsc::UnboundedSender<CapabilityEvent>, silence_timeout: Duration) -> Self {
        let (line_tx, line_rx) = mpsc::channel(16);

        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if line_tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read input: {}", e);
                        break;
                    }
                }
            }
        });

        Self::from_lines(line_rx, events, silence_timeout)
    }

    fn from_lines(
        lines: mpsc::Receiver<String>,
        events: mpsc::UnboundedSender<CapabilityEvent>,
        silence_timeout: Duration,
    ) -> Self {
        Self {
            lines: Arc::new(Mutex::new(lines)),
            events: Some(events),
            silence_timeout,
            exhausted: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            stop_tx: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl RecognitionCapability for LineRecognizer {
    fn configure(&mut self, config: &RecognitionConfig) {
        // Typed lines are already final; interim results never occur
        debug!("Line input configured for {}", config.language);
    }

    fn start(&mut self) -> Result<()> {
        if self.is_running() {
            bail!("recognition has already started");
        }

        if self.exhausted.load(Ordering::SeqCst) {
            self.events = None;
            bail!("input closed");
        }

        let events = match &self.events {
            Some(events) => events.clone(),
            None => bail!("input closed"),
        };

        let (stop_tx, stop_rx) = oneshot::channel();
        self.running.store(true, Ordering::SeqCst);
        tokio::spawn(listen(
            Arc::clone(&self.lines),
            events,
            self.silence_timeout,
            Arc::clone(&self.exhausted),
            Arc::clone(&self.running),
            stop_rx,
        ));

        self.stop_tx = Some(stop_tx);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            // Already finished sessions have dropped the receiver
            let _ = stop_tx.send(());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "line-input"
    }
}

async fn listen(
    lines: Arc<Mutex<mpsc::Receiver<String>>>,
    events: mpsc::UnboundedSender<CapabilityEvent>,
    silence_timeout: Duration,
    exhausted: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let _ = events.send(CapabilityEvent::Started);

    let mut batch = TranscriptBatch::default();
    let mut lines = lines.lock().await;

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = tokio::time::sleep(silence_timeout) => {
                debug!("No input for {:?}, ending session", silence_timeout);
                break;
            }
            line = lines.recv() => match line {
                Some(line) => {
                    let text = line.trim();
                    if text.is_empty() {
                        continue;
                    }

                    let index = batch.events.len();
                    batch.events.push(TranscriptEvent {
                        text: text.to_string(),
                        is_final: true,
                        sequence_index: index,
                    });
                    batch.result_index = index;

                    let _ = events.send(CapabilityEvent::Result(batch.clone()));
                }
                None => {
                    info!("Input closed");
                    exhausted.store(true, Ordering::SeqCst);
                    break;
                }
            },
        }
    }

    // A restart triggered by `End` must find this session finished
    drop(lines);
    running.store(false, Ordering::SeqCst);
    let _ = events.send(CapabilityEvent::End);
}
