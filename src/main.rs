//! RealWaste Classification Server
//!
//! HTTP API that classifies uploaded waste photos with a native inference
//! engine. The engine is loaded and initialized once before the listener
//! opens; startup aborts if that fails.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use realwaste::config::{ConfigOverrides, ServerConfig};
use realwaste::inference::{DynamicEngine, InferenceGateway};
use realwaste::server::{self, AppState};
use realwaste::utils::logging::{init_logging, LogConfig, LogLevel};

/// RealWaste Classification Server
#[derive(Parser, Debug)]
#[command(name = "realwaste-server")]
#[command(version)]
#[command(about = "HTTP API for classifying waste images with a native inference engine")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "REALWASTE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "REALWASTE_PORT")]
    port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "REALWASTE_HOST")]
    host: Option<String>,

    /// Native engine shared library
    #[arg(long, env = "REALWASTE_LIBRARY", value_name = "FILE")]
    library: Option<PathBuf>,

    /// Model file loaded by the native engine
    #[arg(short, long, env = "REALWASTE_MODEL", value_name = "FILE")]
    model: Option<PathBuf>,

    /// Maximum request body size in bytes
    #[arg(long, env = "REALWASTE_MAX_UPLOAD_BYTES")]
    max_upload_bytes: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "REALWASTE_LOG_LEVEL")]
    log_level: Option<LogLevel>,

    /// Verbose logging (debug level with targets and thread ids)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            library_path: self.library.clone(),
            model_path: self.model.clone(),
            max_upload_bytes: self.max_upload_bytes,
            log_level: self.log_level,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Build configuration
    let config = ServerConfig::resolve(cli.config.as_deref(), cli.overrides())
        .context("Invalid configuration")?;

    // Initialize logging
    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::with_level(config.log_level)
    };
    init_logging(&log_config).map_err(anyhow::Error::msg)?;

    info!("RealWaste Classification Server v{}", realwaste::VERSION);
    info!("Configuration:");
    info!("  Library:     {:?}", config.library_path);
    info!("  Model:       {:?}", config.model_path);
    info!("  Upload limit: {} bytes", config.max_upload_bytes);

    // Bring up the native engine before accepting any request
    let engine = DynamicEngine::load(&config.library_path)
        .context("Failed to load native inference engine")?;
    let gateway = InferenceGateway::open(Box::new(engine), &config.model_path)
        .context("Failed to initialize model")?;

    // From here on the gateway releases the engine when the last state
    // handle drops, whichever way main exits.
    let state = Arc::new(AppState::new(gateway));
    let app = server::router(state.clone(), config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    info!("Starting server on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down after {}s", state.uptime_seconds());
    state.gateway.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
