//! Relay server for two-player tic-tac-toe rooms.

pub mod app_state;
pub mod cleanup;
pub mod config;
pub mod game;
pub mod ws_socket;

use anyhow::{Context, Result};
use axum::{extract::State, http::HeaderValue, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::app_state::AppState;
use crate::config::ServerConfig;
use crate::ws_socket::ws_handler;

pub fn app(state: Arc<AppState>, config: &ServerConfig) -> Result<Router> {
    let origin = match &config.cors_origin {
        Some(origin) => AllowOrigin::exact(
            HeaderValue::from_str(origin).with_context(|| format!("invalid CORS origin {}", origin))?,
        ),
        None => AllowOrigin::from(Any),
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state))
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    rooms: usize,
    sessions: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Health> {
    let (rooms, sessions) = state.counts().await;
    Json(Health {
        status: "ok",
        rooms,
        sessions,
    })
}
