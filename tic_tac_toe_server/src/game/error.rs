use thiserror::Error;

/// Why a `makeMove` was refused. Reported to the mover only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("room does not exist")]
    RoomNotFound,
    #[error("cell is outside the board")]
    OutOfRange,
    #[error("cell already taken")]
    CellOccupied,
    #[error("game is already over")]
    GameDecided,
    #[error("not your turn")]
    WrongTurn,
    #[error("malformed move request")]
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Room already exists")]
    RoomExists,
    #[error("Room does not exist")]
    RoomNotFound,
    #[error("Room is full")]
    RoomFull,
    #[error("Invalid move or player turn: {0}")]
    InvalidMove(MoveRejection),
}
