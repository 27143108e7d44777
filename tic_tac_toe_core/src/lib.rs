//! Board, rules and wire messages shared by the relay server and the client.

pub mod message;
pub mod models;
pub mod rules;

pub use message::{decode_client_event, BoardUpdate, ClientEvent, Inbound, MoveRequest, ServerEvent};
pub use models::{Board, BoardError, Mark, Winner, CELL_COUNT};
pub use rules::{is_full, outcome, winner, Outcome, LINES};
