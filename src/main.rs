//! Podcast TTS - render a two-voice podcast episode from a script.
//!
//! Reads an episode document (role-tagged lines of dialogue plus voice settings),
//! synthesizes each line with Kokoro text-to-speech (via sherpa-rs), and writes
//! the concatenated audio as a single WAV file.

mod audio;
mod config;
mod podcast;
mod script;
mod tts;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

use config::AppConfig;
use podcast::{DriverConfig, PodcastDriver};
use script::Episode;
use tts::KokoroEngine;

/// Load the engine and render the episode. Runs on a blocking thread.
fn render_episode(config: AppConfig, driver_config: DriverConfig, episode: Episode, cancel: CancellationToken) -> Result<PathBuf> {
    let engine = KokoroEngine::load(&config.engine_options(), &driver_config.voices).context("Failed to load synthesis engine")?;

    let mut driver = PodcastDriver::new(engine, driver_config);
    let path = driver.run(&episode.segments, &cancel)?;
    Ok(path)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn wait_for_shutdown() {
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("🛑 Received Ctrl+C, stopping after the current segment...");
        }
        _ = async {
            #[cfg(unix)]
            {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(e) => {
                        error!("Failed to register SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            info!("🛑 Received SIGTERM, stopping after the current segment...");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let config = AppConfig::from_args();

    // Respect RUST_LOG env var, fallback to verbose flag, default to info
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| if config.verbose { EnvFilter::try_new("debug") } else { EnvFilter::try_new("info") })
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(LocalTime::new(time::macros::format_description!("[hour]:[minute]:[second]")))
        .init();

    info!("🎧 Podcast TTS v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("❌ Configuration error: {:#}", e);
        std::process::exit(1);
    }

    let (episode, driver_config) = match config.prepare_run() {
        Ok(run) => run,
        Err(e) => {
            error!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    let counts = episode.role_counts();
    info!("Episode \"{}\": {} segments ({} host, {} guest)", driver_config.episode_name, episode.segments.len(), counts.host, counts.guest);
    config.log_config(&driver_config);

    // Synthesis is blocking; run it off the async runtime so signals stay responsive
    let cancel = CancellationToken::new();
    let job_cancel = cancel.clone();
    let mut job = tokio::task::spawn_blocking(move || render_episode(config, driver_config, episode, job_cancel));

    let result = tokio::select! {
        result = &mut job => result,
        _ = wait_for_shutdown() => {
            cancel.cancel();
            job.await
        }
    };

    match result.context("Synthesis task panicked")? {
        Ok(path) => {
            info!("✅ Episode written");
            println!("Podcast audio saved to {}", path.display());
            Ok(())
        }
        Err(e) => {
            error!("❌ {:#}", e);
            std::process::exit(1);
        }
    }
}
