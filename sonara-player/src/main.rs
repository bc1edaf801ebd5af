//! Sonara Player - Main entry point
//!
//! Runs the playback session coordinator as a local service: reconciles with
//! the native player, starts the autoplay monitor and serves the HTTP control
//! surface until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sonara_common::config::TomlConfig;
use sonara_common::events::EventBus;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sonara_player::api::{self, AppContext};
use sonara_player::catalog::CatalogClient;
use sonara_player::config::{Overrides, PlayerConfig};
use sonara_player::db;
use sonara_player::native::{HeadlessPlayer, NativePlayer};
use sonara_player::playback::{reconcile, AutoplayMonitor, Coordinator};

/// Command-line arguments for sonara-player
#[derive(Parser, Debug)]
#[command(name = "sonara-player")]
#[command(about = "Playback session coordinator for the Sonara streaming client")]
#[command(version)]
struct Args {
    /// Config file (overrides SONARA_CONFIG and the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "SONARA_PORT")]
    port: Option<u16>,

    /// Base URL of the search/stream API
    #[arg(long, env = "SONARA_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Preference database path
    #[arg(short, long, env = "SONARA_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Loaded before the subscriber exists: its own log lines are not shown
    let toml_config = TomlConfig::load_or_default(args.config.as_deref());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("sonara_player={},tower_http=info", toml_config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PlayerConfig::resolve(
        &toml_config,
        Overrides {
            port: args.port,
            api_base_url: args.api_base_url,
            database: args.database,
        },
    )
    .context("Invalid configuration")?;

    info!("Starting Sonara Player on port {}", config.port);
    info!("API base URL: {}", config.api_base_url);
    info!("Database: {}", config.database_path.display());
    info!(
        "Fade: {} steps over {:?} ({} curve)",
        config.fade.steps, config.fade.duration, config.fade.curve
    );

    let db_pool = db::connect(&config.database_path)
        .await
        .context("Failed to open preference database")?;

    let catalog = Arc::new(
        CatalogClient::new(&config.api_base_url, config.request_timeout)
            .context("Failed to create API client")?,
    );

    let player: Arc<dyn NativePlayer> = Arc::new(HeadlessPlayer::new());
    let events = Arc::new(EventBus::default());
    let coordinator = Arc::new(Coordinator::new(
        Arc::clone(&player),
        catalog.clone(),
        config.fade,
        events,
    ));

    // Adopt whatever the native service kept alive, else start clean
    if let Some(track) = reconcile(player.as_ref()).await {
        coordinator.restore(track).await;
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = Arc::new(AutoplayMonitor::new(coordinator.clone(), config.poll_interval));
    let monitor_task = tokio::spawn(monitor.run(shutdown_rx));

    let ctx = AppContext {
        coordinator,
        catalog,
        db_pool: db_pool.clone(),
    };

    let served = api::serve(config.bind_addr(), ctx, shutdown_signal()).await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = monitor_task.await {
        error!("Autoplay monitor task failed: {}", e);
    }
    db_pool.close().await;

    served.context("Server error")?;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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
