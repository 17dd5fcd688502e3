//! PaySettle Server Binary
//!
//! Serves the account and settlement API over HTTP.

use tokio::net::TcpListener;
use tracing::{error, info};

use paysettle_server::{create_router, telemetry, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;
    telemetry::init(&config.log_level, config.log_format)?;

    info!("Starting PaySettle");

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let state = AppState::from_config(&config).await?;
    info!(
        storage = %state.storage,
        serialize_per_account = config.settlement.serialize_per_account,
        resettle_policy = %config.settlement.resettle_policy,
        "Services ready"
    );

    let app = create_router(state, config.request_timeout());
    let listener = TcpListener::bind((config.listen_addr.as_str(), config.listen_port)).await?;
    info!(
        listen_addr = %config.listen_addr,
        listen_port = %config.listen_port,
        "PaySettle listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("PaySettle shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");
    info!("Shutdown signal received");
}
