use tic_tac_toe_core::{Board, Mark, ServerEvent, Winner};

/// Client-side view of an online room, folded from server events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnlineGame {
    pub room_id: String,
    pub player: Option<Mark>,
    pub turn: Option<Mark>,
    pub board: Board,
    pub winner: Option<Winner>,
    pub both_joined: bool,
    /// Latest error or notice worth showing.
    pub notice: Option<String>,
}

impl OnlineGame {
    pub fn new(room_id: impl Into<String>) -> Self {
        OnlineGame {
            room_id: room_id.into(),
            ..Default::default()
        }
    }

    pub fn apply(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::PlayerAssignment { player, turn } => {
                self.player = Some(*player);
                self.turn = Some(*turn);
                self.notice = None;
            }
            ServerEvent::UpdateBoard(update) => {
                self.board = update.board;
                self.turn = update.turn;
                self.winner = update.winner;
            }
            ServerEvent::BothPlayersJoined => {
                self.both_joined = true;
                self.notice = Some("Both players joined".to_string());
            }
            ServerEvent::MoveError { message } | ServerEvent::RoomError { message } => {
                self.notice = Some(message.clone());
            }
            ServerEvent::PlayerDisconnected { player } => {
                self.both_joined = false;
                self.notice = Some(format!("Player {} disconnected", player));
            }
        }
    }

    pub fn is_my_turn(&self) -> bool {
        self.both_joined && self.winner.is_none() && self.player.is_some() && self.player == self.turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tic_tac_toe_core::BoardUpdate;

    #[test]
    fn follows_a_room_from_seat_to_result() {
        let mut game = OnlineGame::new("g");
        game.apply(&ServerEvent::PlayerAssignment {
            player: Mark::O,
            turn: Mark::X,
        });
        game.apply(&ServerEvent::BothPlayersJoined);
        assert!(!game.is_my_turn());

        let mut board = Board::new();
        board.place(4, Mark::X).unwrap();
        game.apply(&ServerEvent::UpdateBoard(BoardUpdate {
            board,
            is_x_next: false,
            winner: None,
            turn: Some(Mark::O),
        }));
        assert!(game.is_my_turn());
        assert_eq!(game.board.get(4), Some(Mark::X));

        game.apply(&ServerEvent::UpdateBoard(BoardUpdate {
            board,
            is_x_next: true,
            winner: Some(Winner::Draw),
            turn: None,
        }));
        assert!(!game.is_my_turn());
        assert_eq!(game.winner, Some(Winner::Draw));
    }

    #[test]
    fn errors_and_departures_become_notices() {
        let mut game = OnlineGame::new("g");
        game.apply(&ServerEvent::RoomError {
            message: "Room is full".into(),
        });
        assert_eq!(game.notice.as_deref(), Some("Room is full"));

        game.apply(&ServerEvent::BothPlayersJoined);
        game.apply(&ServerEvent::PlayerDisconnected { player: Mark::X });
        assert!(!game.both_joined);
        assert_eq!(game.notice.as_deref(), Some("Player X disconnected"));
    }
}
