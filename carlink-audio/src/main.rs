//! carlink-audio - Main entry point
//!
//! Brings up an audio session on an offline transport and replays a frame
//! capture through the engine, either to the host's audio devices or, with
//! `--headless`, to in-memory sinks.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carlink_audio::audio::input::CpalMicrophone;
use carlink_audio::audio::memory::{MemoryMicrophone, MemorySinkFactory};
use carlink_audio::audio::output::CpalSinkFactory;
use carlink_audio::audio::{AudioFrame, Microphone, SinkFactory};
use carlink_audio::config::EngineSettings;
use carlink_audio::replay::{frame_duration, load_frames};
use carlink_audio::transport::{DiscardUplink, OfflineTransport};
use carlink_audio::{AudioEngine, AudioSession, SharedState};
use carlink_common::config::TomlConfig;

/// Command-line arguments for carlink-audio
#[derive(Parser, Debug)]
#[command(name = "carlink-audio")]
#[command(about = "Head-unit audio arbitration and mixing engine")]
#[command(version)]
struct Args {
    /// Config file (overrides CARLINK_CONFIG and the default locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frame capture to replay (JSON Lines, one frame per line)
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Use in-memory sinks and microphone instead of audio hardware
    #[arg(long)]
    headless: bool,

    /// Pace data frames by their playback duration
    #[arg(long)]
    realtime: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // RUST_LOG wins over the config file
    let default_filter = format!(
        "carlink_audio={level},carlink_common={level}",
        level = config.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting carlink-audio v{}", env!("CARGO_PKG_VERSION"));

    let settings = EngineSettings::from(&config.audio);
    let (sink_factory, microphone): (Box<dyn SinkFactory>, Box<dyn Microphone>) = if args.headless
    {
        info!("Headless mode: audio goes to in-memory sinks");
        let (microphone, _feeder) = MemoryMicrophone::new();
        (Box::new(MemorySinkFactory::new()), Box::new(microphone))
    } else {
        (
            Box::new(CpalSinkFactory::new(settings.sink_buffer_ms)),
            Box::new(CpalMicrophone::new(settings.microphone_sample_rate)),
        )
    };

    let state = Arc::new(SharedState::new());
    let uplink = Arc::new(DiscardUplink::default());
    let engine = AudioEngine::new(
        settings,
        sink_factory,
        microphone,
        uplink.clone(),
        Arc::clone(&state),
    );
    let session = AudioSession::new(Arc::new(OfflineTransport), engine, Arc::clone(&state));

    let event_logger = tokio::spawn(log_events(Arc::clone(&state)));

    session.start().await.context("Failed to start audio session")?;

    match args.replay.as_deref() {
        Some(path) => {
            let frames = load_frames(path)
                .with_context(|| format!("Failed to load capture {}", path.display()))?;
            info!("Replaying {} frames from {}", frames.len(), path.display());

            tokio::select! {
                _ = replay(&session, &frames, args.realtime) => {
                    info!("Replay complete");
                }
                _ = shutdown_signal() => {}
            }
        }
        None => {
            info!("No capture given, idling until shutdown");
            shutdown_signal().await;
        }
    }

    let stats = session.with_engine(|engine| engine.stats());
    info!(
        "Engine stats: {} frames ({} dropped), {} commands, {} samples written, {} uplink samples",
        stats.frames_received,
        stats.frames_dropped,
        stats.commands_handled,
        stats.samples_written,
        uplink.samples_sent()
    );

    session.stop().await.context("Failed to stop audio session")?;
    event_logger.abort();

    info!("Shutdown complete");
    Ok(())
}

async fn replay(session: &AudioSession, frames: &[AudioFrame], realtime: bool) {
    for frame in frames {
        session.handle_frame(frame);

        if realtime {
            if let Some(duration) = frame_duration(frame) {
                tokio::time::sleep(duration).await;
            }
        }
    }
}

async fn log_events(state: Arc<SharedState>) {
    let mut rx = state.subscribe_events();
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => info!("Event: {}", json),
                Err(e) => error!("Failed to serialize {} event: {}", event.event_type(), e),
            },
            Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                info!("Event logger lagged, {} events missed", missed);
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
