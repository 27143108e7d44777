use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tic_tac_toe_core::{ClientEvent, Mark, MoveRequest, ServerEvent};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use tungstenite::Message;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("websocket error: {0}")]
    Socket(#[from] tungstenite::Error),
    #[error("could not encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Connection to the relay server. Cloning shares the same socket.
#[derive(Clone)]
pub struct GameService {
    socket_write: Arc<Mutex<SplitSink<Socket, Message>>>,
}

/// `http(s)://host` becomes `ws(s)://host/ws`. A bare `host:port` is taken as `ws://`.
pub fn websocket_url(server_url: &str) -> String {
    let trimmed = server_url.trim().trim_end_matches('/');
    let url = if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("ws://{}", trimmed)
    };
    if url.ends_with("/ws") {
        url
    } else {
        format!("{}/ws", url)
    }
}

impl GameService {
    /// Connects and starts forwarding server events into the returned channel.
    pub async fn connect(
        server_url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ServerEvent>), ServiceError> {
        let url = websocket_url(server_url);
        let (stream, _) = connect_async(url.as_str()).await?;
        info!("✅ Connected to {}", url);

        let (write, read) = stream.split();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            if let Err(e) = listen_for_messages(read, tx).await {
                error!("❌ Error in WebSocket listener: {}", e);
            }
        });

        Ok((
            GameService {
                socket_write: Arc::new(Mutex::new(write)),
            },
            rx,
        ))
    }

    pub async fn create_room(&self, room_id: &str) -> Result<(), ServiceError> {
        self.send(&ClientEvent::CreateRoom(room_id.to_string())).await
    }

    pub async fn join_room(&self, room_id: &str) -> Result<(), ServiceError> {
        self.send(&ClientEvent::JoinRoom(room_id.to_string())).await
    }

    pub async fn make_move(&self, room_id: &str, index: usize, player: Mark) -> Result<(), ServiceError> {
        self.send(&ClientEvent::MakeMove(MoveRequest {
            room_id: room_id.to_string(),
            index,
            player,
        }))
        .await
    }

    pub async fn restart_game(&self, room_id: &str) -> Result<(), ServiceError> {
        self.send(&ClientEvent::RestartGame(room_id.to_string())).await
    }

    pub async fn close(&self) -> Result<(), ServiceError> {
        self.socket_write.lock().await.close().await?;
        Ok(())
    }

    async fn send(&self, event: &ClientEvent) -> Result<(), ServiceError> {
        let text = serde_json::to_string(event)?;
        debug!("📤 Sending: {}", text);
        self.socket_write
            .lock()
            .await
            .send(Message::Text(text.into()))
            .await?;
        Ok(())
    }
}

async fn listen_for_messages(
    mut socket_read: SplitStream<Socket>,
    tx: mpsc::UnboundedSender<ServerEvent>,
) -> Result<(), ServiceError> {
    while let Some(message) = socket_read.next().await {
        match message? {
            Message::Text(text) => match serde_json::from_str::<ServerEvent>(text.as_str()) {
                Ok(event) => {
                    if tx.send(event).is_err() {
                        debug!("Event receiver dropped, stopping listener");
                        break;
                    }
                }
                Err(e) => warn!("⚠️ Unknown message: {} ({})", text.as_str(), e),
            },
            Message::Close(reason) => {
                info!("Server closed the connection: {:?}", reason);
                break;
            }
            _ => {}
        }
    }

    info!("WebSocket listener finished.");
    Ok(())
}
