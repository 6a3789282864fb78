//! Modulus prediction API - Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use modulus::logging::{LogTarget, init_logging};
use modulus::{PluginCatalog, SchemaRegistry, api, config::ModulusConfig, metrics};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;

#[derive(Parser, Debug)]
#[command(name = "modulus-api")]
#[command(about = "Prediction API for discovered Modulus models", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override API port
    #[arg(long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format (json or pretty)
    #[arg(long, default_value = "json")]
    log_format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, &cli.log_format, LogTarget::Stdout);

    tracing::info!("Starting Modulus prediction API");

    // Load configuration
    let mut config = ModulusConfig::load(cli.config)?;

    // CLI overrides
    if let Some(port) = cli.port {
        config.api_port = port;
    }

    config.validate()?;

    tracing::info!(
        api_host = %config.api_host,
        api_port = config.api_port,
        disabled_models = ?config.disabled_models,
        "Configuration loaded"
    );

    // Setup metrics
    let prometheus_handle = metrics::setup_metrics()?;

    // Discover model schemas
    let catalog = PluginCatalog::builtin().without(&config.disabled_models);
    let registry = Arc::new(SchemaRegistry::discover(&catalog));

    if registry.is_empty() {
        tracing::warn!("No model schemas registered; every prediction request will be rejected");
    }

    // Setup API
    let app_state = api::AppState {
        registry,
        prometheus_handle,
    };

    let app = api::create_router(app_state);

    let addr = config.bind_address();
    tracing::info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind API server to {}", addr))?;

    // Graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")?;

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
