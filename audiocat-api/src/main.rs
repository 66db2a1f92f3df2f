//! audiocat-api - audio upload and catalog service
//!
//! Startup sequence: parse arguments, load config, init tracing, log build
//! identification, create directories, open the catalog database, serve until
//! Ctrl+C or SIGTERM, then close the database.

use std::path::PathBuf;

use anyhow::{Context, Result};
use audiocat_api::{build_router, db, AppState};
use audiocat_common::config::{CliOverrides, CompiledDefaults, ServiceConfig, TomlConfig};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for audiocat-api
#[derive(Parser, Debug)]
#[command(name = "audiocat-api")]
#[command(about = "Audio upload and catalog service")]
#[command(version)]
struct Args {
    /// Root folder for the database and uploads
    #[arg(short, long, env = "AUDIOCAT_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Directory for uploaded files (default: <root>/uploads)
    #[arg(long, env = "AUDIOCAT_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// SQLite catalog file (default: <root>/audiocat.db)
    #[arg(long, env = "AUDIOCAT_DATABASE")]
    database: Option<PathBuf>,

    /// Address to bind
    #[arg(short, long, env = "AUDIOCAT_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "AUDIOCAT_PORT")]
    port: Option<u16>,

    /// TOML config file
    #[arg(short, long, env = "AUDIOCAT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, env = "AUDIOCAT_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn into_overrides(self) -> CliOverrides {
        CliOverrides {
            root_folder: self.root_folder,
            storage_dir: self.storage_dir,
            database_path: self.database,
            bind: self.bind,
            port: self.port,
            log_level: self.log_level,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The log level may come from the config file, so tracing starts after it
    // is read and the file status is reported afterwards
    let (file_config, file_status) = TomlConfig::load_or_default(args.config.as_deref());
    let config = ServiceConfig::resolve(
        args.into_overrides(),
        file_config,
        CompiledDefaults::for_current_platform(),
    );

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=debug", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting audiocat-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    file_status.log();

    config
        .ensure_directories()
        .context("Failed to create root folder or storage directory")?;
    info!("Storage directory: {}", config.storage_dir.display());
    info!("Database path: {}", config.database_path.display());
    info!("Duplicate policy: {:?}", config.duplicate_policy);

    let pool = db::init_database(&config.database_path)
        .await
        .context("Failed to initialize catalog database")?;
    info!("✓ Catalog database ready");

    let state = AppState::new(pool.clone(), config.storage_dir.clone(), config.duplicate_policy)
        .with_max_upload_bytes(config.max_upload_bytes);
    let app = build_router(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("audiocat-api listening on http://{}", addr);
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
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
