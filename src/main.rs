//! Relevant Cache - HTTP front-end over a dependency-aware cache

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relevant_cache::api::{create_router, AppState};
use relevant_cache::config::{BackendKind, Config};
use relevant_cache::{MemoryCache, RedisCache};

/// Main entry point for the Relevant Cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Construct the configured backend
/// 4. Create Axum router with all endpoints
/// 5. Serve until SIGINT/SIGTERM, then close the backend
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relevant_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Relevant Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, port={}, scan_count={:?}",
        config.backend, config.server_port, config.scan_count
    );

    let state = build_state(&config).await?;
    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    state.cache.close().context("failed to close backend")?;
    info!("Server shutdown complete");
    Ok(())
}

/// Constructs the backend named by the configuration.
async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let options = config.cache_options();
    match config.backend {
        BackendKind::Memory => Ok(AppState::new(MemoryCache::with_options(options))),
        BackendKind::Redis => {
            let url = config.redis_url.clone();
            let cache = tokio::task::spawn_blocking(move || RedisCache::connect(&url, options))
                .await
                .context("redis connect task failed")?
                .context("failed to connect to redis")?;
            Ok(AppState::new(cache))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
