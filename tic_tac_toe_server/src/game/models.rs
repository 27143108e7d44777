use std::collections::BTreeMap;
use std::str::FromStr;

use tic_tac_toe_core::{outcome, winner, Board, BoardError, BoardUpdate, Mark, Outcome};
use tracing::debug;
use uuid::Uuid;

use super::error::MoveRejection;

pub type SessionId = Uuid;

pub const MAX_MEMBERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    WaitingForSecondPlayer,
    InProgress,
    Finished(Outcome),
}

/// Which mark `playerDisconnected` names when a member leaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisconnectReport {
    /// The mark whose turn it currently is not, regardless of who left.
    #[default]
    TurnDerived,
    /// The mark the leaving session was assigned.
    SessionMark,
}

impl FromStr for DisconnectReport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "turn" => Ok(DisconnectReport::TurnDerived),
            "session" => Ok(DisconnectReport::SessionMark),
            other => Err(format!("expected `turn` or `session`, got `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub session: SessionId,
    pub mark: Mark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub board: Board,
    pub next_mark: Mark,
    pub members: Vec<Member>,
}

impl Default for Room {
    fn default() -> Self {
        Room {
            board: Board::new(),
            next_mark: Mark::X,
            members: Vec::with_capacity(MAX_MEMBERS),
        }
    }
}

impl Room {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= MAX_MEMBERS
    }

    pub fn mark_of(&self, session: SessionId) -> Option<Mark> {
        self.members
            .iter()
            .find(|member| member.session == session)
            .map(|member| member.mark)
    }

    pub fn sessions(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.members.iter().map(|member| member.session)
    }

    pub fn state(&self) -> RoomState {
        match outcome(&self.board) {
            Outcome::Continue if self.is_full() => RoomState::InProgress,
            Outcome::Continue => RoomState::WaitingForSecondPlayer,
            decided => RoomState::Finished(decided),
        }
    }

    /// Validates and applies one move. On rejection nothing changes.
    pub fn apply_move(&mut self, index: usize, player: Mark) -> Result<Outcome, MoveRejection> {
        if winner(&self.board).is_some() {
            debug!("Move rejected: game is already decided.");
            return Err(MoveRejection::GameDecided);
        }
        if self.next_mark != player {
            debug!("Move rejected: not {:?}'s turn.", player);
            return Err(MoveRejection::WrongTurn);
        }

        self.board.place(index, player).map_err(|err| {
            debug!("Move rejected: {}", err);
            match err {
                BoardError::OutOfRange(_) => MoveRejection::OutOfRange,
                BoardError::Occupied(_) => MoveRejection::CellOccupied,
            }
        })?;
        self.next_mark = self.next_mark.opponent();

        let result = outcome(&self.board);
        debug!("Move applied: {:?} at {}, outcome {:?}", player, index, result);
        Ok(result)
    }

    pub fn reset(&mut self) {
        self.board.clear();
        self.next_mark = Mark::X;
    }

    /// Snapshot broadcast to members; `turn` is cleared once the game is decided.
    pub fn board_update(&self) -> BoardUpdate {
        let result = outcome(&self.board);
        BoardUpdate {
            board: self.board,
            is_x_next: self.next_mark == Mark::X,
            winner: result.winner(),
            turn: (!result.is_decided()).then_some(self.next_mark),
        }
    }
}

/// Rooms a live connection belongs to and the mark it holds in each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub rooms: BTreeMap<String, Mark>,
}
