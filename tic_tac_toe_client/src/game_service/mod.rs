pub mod model;
pub mod service;

pub use model::OnlineGame;
pub use service::{websocket_url, GameService, ServiceError};
