use anyhow::Context;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, Level};

use tutorconnect::config::AppConfig;
use tutorconnect::server::create_router;
use tutorconnect::types::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to load configuration")?;

    let level = Level::from_str(&config.log_level).unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let address = config.address.clone();
    let state = Arc::new(AppState::new(config).context("Failed to build application state")?);
    info!(
        teachers = state.marketplace.teachers().len(),
        ai_configured = state.ai.is_configured(),
        "Seed data loaded"
    );

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on {}", address);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
