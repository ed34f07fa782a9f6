mod api;
mod metrics;
mod scheduler;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use airtime_core::{
    load_config, validate_config, AcquisitionDriver, Config, EpisodeStore, JellyfinClient,
    JsonEpisodeStore, LibraryNotifier, NoopNotifier, RealDebridClient, ReleaseFilter,
    SonarrClient, SqliteEpisodeStore, StoreBackend, TorrentioClient,
};

use api::create_router;
use state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_logging();

    // Determine config path
    let config_path = std::env::var("AIRTIME_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Store: {:?} at {:?}", config.store.backend, config.store.path);

    let store = create_store(&config)?;
    let driver = create_driver(&config, Arc::clone(&store))?;

    let state = Arc::new(AppState::new(config.clone(), store));

    let (shutdown_tx, _) = broadcast::channel(1);
    let scheduler_handle = scheduler::spawn(
        driver,
        Arc::clone(&state),
        &config.scheduler,
        shutdown_tx.subscribe(),
    );

    if config.server.enabled {
        let app = create_router(state);

        let addr = SocketAddr::new(config.server.host, config.server.port);
        info!("Starting server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        // Run server with graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;
    } else {
        info!("HTTP server disabled in config");
        shutdown_signal().await;
    }

    info!("Shutting down, waiting for the pass in flight...");
    let _ = shutdown_tx.send(());
    scheduler_handle.await.context("Scheduler task failed")?;
    info!("Shutdown complete");

    Ok(())
}

/// Human-readable logs by default, JSON lines when `AIRTIME_LOG_JSON` is set.
fn init_logging() {
    let json = std::env::var("AIRTIME_LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let (json_layer, text_layer) = if json {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn create_store(config: &Config) -> Result<Arc<dyn EpisodeStore>> {
    let store: Arc<dyn EpisodeStore> = match config.store.backend {
        StoreBackend::Json => Arc::new(JsonEpisodeStore::new(config.store.path.clone())),
        StoreBackend::Sqlite => Arc::new(
            SqliteEpisodeStore::new(&config.store.path)
                .context("Failed to open SQLite episode store")?,
        ),
    };
    info!("Episode store initialized ({})", store.name());
    Ok(store)
}

fn create_driver(config: &Config, store: Arc<dyn EpisodeStore>) -> Result<AcquisitionDriver> {
    info!("Initializing Sonarr client at {}", config.sonarr.url);
    let series = SonarrClient::new(config.sonarr.clone()).context("Failed to create Sonarr client")?;

    info!("Initializing Torrentio client at {}", config.torrentio.url);
    let indexer =
        TorrentioClient::new(config.torrentio.clone()).context("Failed to create Torrentio client")?;

    let downloader = RealDebridClient::new(config.real_debrid.clone())
        .context("Failed to create Real-Debrid client")?;

    let notifier: Arc<dyn LibraryNotifier> = match &config.jellyfin {
        Some(jellyfin) => {
            info!("Initializing Jellyfin client at {}", jellyfin.url);
            Arc::new(
                JellyfinClient::new(jellyfin.clone()).context("Failed to create Jellyfin client")?,
            )
        }
        None => {
            info!("Jellyfin not configured, library refresh disabled");
            Arc::new(NoopNotifier)
        }
    };

    Ok(AcquisitionDriver::new(
        store,
        Arc::new(series),
        Arc::new(indexer),
        Arc::new(downloader),
        notifier,
        ReleaseFilter::from_config(&config.filter),
    ))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
