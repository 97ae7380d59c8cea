use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing::{info, warn};

mod api;
mod catalog;
mod config;
mod error;
mod gemini;
mod i18n;
mod service;
mod voice;
mod websocket;

use crate::config::RuntimeConfig;
use crate::service::AuraService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!("Starting Aura service v{}", env!("CARGO_PKG_VERSION"));

    // Static + dynamic config from config.toml and AURA__* env vars
    let runtime_config = Arc::new(RuntimeConfig::load()?);
    let server = &runtime_config.static_config.server;
    info!(
        host = %server.host,
        port = server.port,
        "Configuration loaded"
    );

    if runtime_config.dynamic().gemini.credential().is_none() {
        warn!("No Gemini API key configured; clients must provide their own");
    }

    let metrics_handle = PrometheusBuilder::new().install_recorder()?;

    let service = Arc::new(AuraService::new(runtime_config.clone()));
    let app = api::router(service, metrics_handle);

    let addr = runtime_config.static_config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aura_service=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
