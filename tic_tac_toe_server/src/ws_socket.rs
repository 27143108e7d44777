use crate::app_state::AppState;

use anyhow::{Context, Result};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use std::sync::Arc;
use tic_tac_toe_core::{decode_client_event, Inbound, ServerEvent};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[axum::debug_handler]
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl axum::response::IntoResponse {
    info!("🔗 WebSocket connection attempt received!");

    ws.on_upgrade(move |socket| async move {
        let session = Uuid::new_v4();
        if let Err(e) = handle_socket(socket, session, &state).await {
            error!("❌ WebSocket processing failed for {}: {:#}", session, e);
        }
        state.disconnect(session).await;
    })
}

async fn handle_socket(mut socket: WebSocket, session: Uuid, state: &AppState) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.register(session, tx).await;

    info!("✅ WebSocket connection established for session {}", session);

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        debug!("📩 Received from {}: {}", session, text.as_str());
                        match decode_client_event(text.as_str()) {
                            Inbound::Event(event) => state.dispatch(session, event).await,
                            Inbound::MalformedMove => {
                                warn!("⚠️ Malformed makeMove from {}", session);
                                state.reject_malformed_move(session).await;
                            }
                            Inbound::Unrecognized(reason) => {
                                warn!("⚠️ Ignoring unrecognized message from {}: {}", session, reason);
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        socket.send(Message::Pong(data)).await.context("sending pong")?;
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(reason))) => {
                        info!("WebSocket closed by {}: {:?}", session, reason);
                        break;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        warn!("⚠️ Ignoring binary frame from {}", session);
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", session, e);
                        break;
                    }
                    None => break,
                }
            }

            Some(event) = rx.recv() => {
                send_event(&mut socket, &event).await?;
            }
        }
    }

    Ok(())
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<()> {
    let text = serde_json::to_string(event).context("encoding server event")?;
    debug!("📤 Sending: {}", text);
    socket
        .send(Message::Text(text.into()))
        .await
        .context("sending server event")
}
