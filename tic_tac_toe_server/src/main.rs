use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tic_tac_toe_server::app_state::AppState;
use tic_tac_toe_server::cleanup::{reap_abandoned_rooms, ReaperConfig};
use tic_tac_toe_server::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    let app_state = Arc::new(AppState::new(config.disconnect_report));
    let app = tic_tac_toe_server::app(Arc::clone(&app_state), &config)?;

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr()))?;

    info!("Server is running on {}", listener.local_addr()?);
    info!(
        "Reaping abandoned rooms every {}s, disconnect report: {:?}",
        config.reap_interval.as_secs(),
        config.disconnect_report
    );

    tokio::spawn(reap_abandoned_rooms(
        Arc::clone(&app_state),
        ReaperConfig::from(&config),
    ));
    if let Err(e) = axum::serve(listener, app).await {
        error!("❌ Server error: {}", e);
        return Err(e.into());
    }
    Ok(())
}
