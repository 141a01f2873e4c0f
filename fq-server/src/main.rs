//! fq-server - authoritative pricing and order service
//!
//! Opens (creating and seeding on first run) the SQLite database and serves
//! the pricing, parameter, materials, order and stats endpoints.

use anyhow::{Context, Result};
use clap::Parser;
use fq_common::config::{ServerOverrides, ServerSettings, TomlConfig};
use fq_common::db::init_database;
use fq_server::{build_router, AppState};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for fq-server
#[derive(Parser, Debug)]
#[command(name = "fq-server")]
#[command(about = "Authoritative pricing and order service for fabquote")]
#[command(version)]
struct Args {
    /// Path to config.toml
    #[arg(short, long, env = "FQ_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "FQ_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "FQ_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "FQ_DATABASE")]
    database: Option<PathBuf>,

    /// Log level or EnvFilter directive (RUST_LOG takes precedence)
    #[arg(long, env = "FQ_LOG_LEVEL")]
    log_level: Option<String>,

    /// Accept parameter updates outside their configured bounds
    #[arg(long, env = "FQ_LENIENT_BOUNDS")]
    lenient_bounds: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml_config, config_source) =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let settings = ServerSettings::resolve(
        &toml_config,
        ServerOverrides {
            bind_address: args.bind_address,
            port: args.port,
            database_path: args.database,
            log_level: args.log_level,
            lenient_bounds: args.lenient_bounds,
        },
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fabquote server v{}", env!("CARGO_PKG_VERSION"));
    match &config_source {
        Some(path) => info!("Configuration: {}", path.display()),
        None => warn!("No configuration file found, using defaults"),
    }
    info!("Database path: {}", settings.database_path.display());
    info!("Parameter bounds policy: {:?}", settings.bounds_policy);

    let pool = match init_database(&settings.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e).context("Database initialization failed");
        }
    };

    let state = AppState::new(pool.clone(), settings.bounds_policy);
    let app = build_router(state);

    let addr = settings.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("fq-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
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
                error!("Failed to install SIGTERM handler: {}", e);
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
