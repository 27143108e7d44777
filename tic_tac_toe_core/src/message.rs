use serde::{Deserialize, Serialize};

use crate::models::{Board, Mark, Winner};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub room_id: String,
    pub index: usize,
    pub player: Mark,
}

/// Authoritative room state as broadcast to every member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardUpdate {
    pub board: Board,
    pub is_x_next: bool,
    pub winner: Option<Winner>,
    pub turn: Option<Mark>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    CreateRoom(String),
    JoinRoom(String),
    MakeMove(MoveRequest),
    RestartGame(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    PlayerAssignment { player: Mark, turn: Mark },
    UpdateBoard(BoardUpdate),
    BothPlayersJoined,
    MoveError { message: String },
    RoomError { message: String },
    PlayerDisconnected { player: Mark },
}

/// What the server makes of one inbound text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Event(ClientEvent),
    /// A `makeMove` frame whose payload did not decode. Answered with `moveError`.
    MalformedMove,
    Unrecognized(String),
}

pub fn decode_client_event(text: &str) -> Inbound {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => Inbound::Event(event),
        Err(err) => {
            let is_move = serde_json::from_str::<serde_json::Value>(text)
                .map(|value| value["event"] == "makeMove")
                .unwrap_or(false);
            if is_move {
                Inbound::MalformedMove
            } else {
                Inbound::Unrecognized(err.to_string())
            }
        }
    }
}
