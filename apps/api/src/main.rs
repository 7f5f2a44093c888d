mod config;
mod errors;
mod models;
mod portfolio;
mod providers;
mod routes;
mod state;

use anyhow::Result;
use chrono::{Datelike, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::portfolio::contract::ExtractionContract;
use crate::providers::build_provider;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; a provider without credentials stops startup here
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the one active provider
    let provider = build_provider(&config.provider)?;
    info!(
        "Provider initialized: {} (model: {}, input: {:?})",
        provider.name(),
        config.provider.model,
        provider.input_mode()
    );

    let contract = ExtractionContract::new(Utc::now().year());
    info!("Extraction contract v{}", contract.version);

    let state = AppState {
        provider,
        contract: Arc::new(contract),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
