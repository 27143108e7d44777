pub mod error;
pub mod handlers;
pub mod models;

pub use error::{MoveRejection, RoomError};
pub use handlers::{Coordinator, Envelope};
pub use models::{DisconnectReport, Room, RoomState, Session, SessionId};
