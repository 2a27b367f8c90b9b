use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use live_translator::{
    create_router, AppState, ChannelClient, Config, GroqClient, LineRecognizer, ReconnectPolicy,
    RecognitionController, TranslationRelay,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "live-translator", version, about = "Live speech translation relay")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/live-translator")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the translation relay (default)
    Serve,
    /// Connect to a relay and translate lines typed on stdin
    Listen {
        /// Relay WebSocket endpoint
        #[arg(long)]
        endpoint: Option<String>,
        /// Language to translate into
        #[arg(long)]
        target_language: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cfg).await,
        Command::Listen {
            endpoint,
            target_language,
        } => {
            let endpoint = endpoint.unwrap_or_else(|| cfg.client.endpoint.clone());
            let target_language =
                target_language.unwrap_or_else(|| cfg.client.target_language.clone());
            listen(cfg, endpoint, target_language).await
        }
    }
}

async fn serve(cfg: Config) -> Result<()> {
    info!("Server Configuration:");
    info!(
        "  - Completion API: {}",
        if cfg.completion.api_key.is_some() {
            "Configured"
        } else {
            "Missing"
        }
    );
    info!("  - Model: {}", cfg.completion.model);
    info!("  - Allowed origins: {}", cfg.service.allowed_origins.join(", "));

    let provider = GroqClient::new(&cfg.completion)?;
    let relay = TranslationRelay::new(Arc::new(provider));
    info!("  - Provider: {}", relay.provider_name());
    let app = create_router(AppState::new(relay, cfg.service.allowed_origins.clone()));

    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Translation Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Translation Server stopped");
    Ok(())
}

async fn listen(cfg: Config, endpoint: String, target_language: String) -> Result<()> {
    let policy = ReconnectPolicy {
        initial_delay: Duration::from_millis(cfg.client.reconnect_initial_ms),
        max_delay: Duration::from_millis(cfg.client.reconnect_max_ms),
    };
    let client = ChannelClient::connect(
        &endpoint,
        policy,
        Duration::from_secs(cfg.client.error_display_secs),
    );

    info!("Translating into {} via {}", target_language, endpoint);
    info!("Type English text, one chunk per line (Ctrl-C to quit)");

    let printer = tokio::spawn(print_translations(client.clone()));

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let recognizer = LineRecognizer::stdin(
        events_tx,
        Duration::from_secs(cfg.client.silence_timeout_secs),
    );
    let controller = RecognitionController::new(recognizer, client.clone(), target_language);
    let reporter = tokio::spawn(report_session(
        controller.subscribe_transcript(),
        controller.subscribe_notice(),
    ));

    controller.run(events_rx, shutdown_signal()).await;

    client.close();
    if tokio::time::timeout(Duration::from_secs(2), client.closed())
        .await
        .is_err()
    {
        warn!("Channel did not close in time");
    }
    printer.abort();
    reporter.abort();

    Ok(())
}

/// Log the live transcript and surface recognition notices
async fn report_session(
    mut transcript: watch::Receiver<String>,
    mut notice: watch::Receiver<Option<String>>,
) {
    loop {
        tokio::select! {
            changed = transcript.changed() => {
                if changed.is_err() {
                    break;
                }
                let text = transcript.borrow_and_update().clone();
                if !text.is_empty() {
                    debug!("Heard: {}", text);
                }
            }
            changed = notice.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(message) = notice.borrow_and_update().clone() {
                    warn!("{}", message);
                }
            }
        }
    }
}

/// Print each new translation as it arrives
async fn print_translations(client: ChannelClient) {
    let mut translations = client.subscribe_translations();
    let mut seen = 0;

    while translations.changed().await.is_ok() {
        let log = translations.borrow_and_update().clone();
        // Newest first; print what arrived since last time, oldest first
        for record in log.iter().take(log.len().saturating_sub(seen)).rev() {
            println!("{} -> {}", record.original, record.translated);
        }
        seen = log.len();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
