//! Service entry point.
//!
//! Startup order: tracing first, then configuration, then store and
//! guard (inside the server), then the listener. The server drains
//! in-flight requests on SIGINT/SIGTERM before exiting.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config_registry::config::loader::load_config;
use config_registry::config::ServiceConfig;
use config_registry::store::MemoryBackend;
use config_registry::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "config-registry", about = "Versioned configuration registry")]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "config_registry=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        rate_limit = config.rate_limit.enabled,
        "config-registry starting"
    );

    let backend = Arc::new(MemoryBackend::new());
    let server = HttpServer::new(&config, backend);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    server.run(listener).await?;

    tracing::info!("config-registry stopped");
    Ok(())
}
