//! recordstore Server Binary
//!
//! Starts the HTTP server over a slot file.

use std::sync::Arc;

use clap::Parser;
use recordstore::config::ConfigBuilder;
use recordstore::{http, Config, Engine, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// recordstore Server
///
/// Defaults come from PORT, BINARY_FILE_PATH and LOG_DEBUG; flags override them.
#[derive(Parser, Debug)]
#[command(name = "recordstore-server")]
#[command(about = "CRUD HTTP API over a fixed-slot binary record file")]
#[command(version)]
struct Args {
    /// Path of the record file
    #[arg(short = 'f', long)]
    data_file: Option<String>,

    /// Listen address (host:port)
    #[arg(short, long)]
    listen: Option<String>,

    /// fsync the record file after every write
    #[arg(long)]
    sync_every_write: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let env_config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut builder = ConfigBuilder::from_config(env_config);
    if let Some(path) = &args.data_file {
        builder = builder.data_file(path);
    }
    if let Some(addr) = &args.listen {
        builder = builder.listen_addr(addr);
    }
    if args.sync_every_write {
        builder = builder.sync_strategy(SyncStrategy::EveryWrite);
    }
    if args.debug {
        builder = builder.log_debug(true);
    }
    let config = builder.build();

    // Initialize tracing/logging
    let default_level = if config.log_debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    tracing::info!("recordstore Server v{}", recordstore::VERSION);
    tracing::info!("Data file: {}", config.data_file.display());
    tracing::info!("Listen address: {}", config.listen_addr);

    // Open engine
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", config.listen_addr);

    let app = http::router(engine.clone());
    if let Err(e) = http::serve(listener, app, http::shutdown_signal()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    // Router and its state are gone once serve returns
    match Arc::try_unwrap(engine) {
        Ok(engine) => {
            if let Err(e) = engine.close() {
                tracing::error!("Failed to close engine: {}", e);
                std::process::exit(1);
            }
        }
        Err(_) => tracing::warn!("Engine still shared at shutdown, skipping close"),
    }

    tracing::info!("Server shutdown gracefully");
}
