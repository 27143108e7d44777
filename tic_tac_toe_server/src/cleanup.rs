use crate::app_state::AppState;
use crate::config::ServerConfig;

use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct ReaperConfig {
    pub interval: Duration,
    pub probe_url: Option<String>,
    pub probe_timeout: Duration,
}

impl From<&ServerConfig> for ReaperConfig {
    fn from(config: &ServerConfig) -> Self {
        ReaperConfig {
            interval: config.reap_interval,
            probe_url: config.probe_url.clone(),
            probe_timeout: config.probe_timeout,
        }
    }
}

/// Every tick, drop rooms that are empty or still waiting for a second player.
/// There is no grace period: a lone player is abandoned after one tick.
pub async fn reap_abandoned_rooms(app_state: Arc<AppState>, config: ReaperConfig) {
    let client = match reqwest::Client::builder()
        .timeout(config.probe_timeout)
        .build()
    {
        Ok(client) => Some(client),
        Err(e) => {
            error!("❌ Could not build liveness probe client: {}", e);
            None
        }
    };

    loop {
        tokio::time::sleep(config.interval).await;

        reap_once(&app_state).await;

        if let (Some(client), Some(url)) = (&client, &config.probe_url) {
            probe(client, url).await;
        }
    }
}

pub async fn reap_once(app_state: &AppState) -> Vec<String> {
    let removed = app_state.reap().await;
    for room_id in &removed {
        info!("Room {} removed due to empty or single player.", room_id);
    }
    if !removed.is_empty() {
        let (rooms, _) = app_state.counts().await;
        info!("Cleaned up abandoned rooms. Remaining: {}", rooms);
    }
    removed
}

/// Outbound reachability check. Only ever logged.
async fn probe(client: &reqwest::Client, url: &str) {
    match client.get(url).send().await {
        Ok(response) if response.status().is_success() => {
            info!("Liveness probe ok ({})", response.status());
        }
        Ok(response) => warn!("Liveness probe to {} returned {}", url, response.status()),
        Err(e) => warn!("Liveness probe to {} failed: {}", url, e),
    }
}
