use thiserror::Error;
use tic_tac_toe_core::{outcome, Board, BoardError, Mark, Winner};
use tracing::{info, warn};

use crate::selector::{Difficulty, Selector, Strategy, CPU, HUMAN};
use crate::stats::{KeyValueStore, StatsTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocalMoveError {
    #[error("the game is over, restart to play again")]
    GameOver,
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Single-player game: the human is X and moves first, the computer answers as O.
#[derive(Debug)]
pub struct LocalGame<S> {
    board: Board,
    turn: Mark,
    winner: Option<Winner>,
    difficulty: Difficulty,
    selector: Selector,
    stats: StatsTracker<S>,
}

impl<S: KeyValueStore> LocalGame<S> {
    pub fn new(stats: StatsTracker<S>, difficulty: Difficulty) -> Self {
        let selector = Selector::new(difficulty, stats.counters());
        LocalGame {
            board: Board::new(),
            turn: HUMAN,
            winner: None,
            difficulty,
            selector,
            stats,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Mark {
        self.turn
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn stats(&self) -> &StatsTracker<S> {
        &self.stats
    }

    pub fn strategy(&self) -> Strategy {
        self.selector.strategy()
    }

    /// Plays the human's move and, if the game goes on, the computer's reply.
    /// Returns the cell the computer took.
    pub fn play(&mut self, index: usize) -> Result<Option<usize>, LocalMoveError> {
        if self.winner.is_some() {
            return Err(LocalMoveError::GameOver);
        }
        self.board.place(index, HUMAN)?;
        if self.settle() {
            return Ok(None);
        }

        self.turn = CPU;
        let reply = self.selector.choose(&self.board);
        if let Some(cell) = reply {
            self.board.place(cell, CPU)?;
            if self.settle() {
                return Ok(reply);
            }
        }
        self.turn = HUMAN;
        Ok(reply)
    }

    pub fn restart(&mut self) {
        self.board.clear();
        self.turn = HUMAN;
        self.winner = None;
        self.selector = Selector::new(self.difficulty, self.stats.counters());
    }

    /// Records the result once the board is decided. Returns true if it is.
    fn settle(&mut self) -> bool {
        let Some(winner) = outcome(&self.board).winner() else {
            return false;
        };
        self.winner = Some(winner);
        info!("Local game finished: {}", winner);
        if let Err(e) = self.stats.record(winner) {
            warn!("Could not save stats: {}", e);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::MemoryStore;

    fn game(difficulty: Difficulty) -> LocalGame<MemoryStore> {
        LocalGame::new(StatsTracker::new(MemoryStore::default()), difficulty)
    }

    /// Human always takes the first free cell.
    fn play_out(game: &mut LocalGame<MemoryStore>) -> Winner {
        while game.winner().is_none() {
            let cell = game.board().empty_cells().next().unwrap();
            game.play(cell).unwrap();
        }
        game.winner().unwrap()
    }

    #[test]
    fn computer_answers_each_human_move() {
        let mut game = game(Difficulty::Perfect);
        let reply = game.play(0).unwrap();

        let reply = reply.expect("computer should move");
        assert_eq!(game.board().get(reply), Some(Mark::O));
        assert_eq!(game.board().empty_cells().count(), 7);
        assert_eq!(game.turn(), Mark::X);
    }

    #[test]
    fn first_softened_game_prefers_the_center() {
        let mut game = game(Difficulty::Softened);
        assert_eq!(game.strategy(), Strategy::Preference);
        assert_eq!(game.play(0), Ok(Some(4)));
    }

    #[test]
    fn occupied_cells_and_finished_games_are_rejected() {
        let mut game = game(Difficulty::Perfect);
        let reply = game.play(0).unwrap().unwrap();
        assert_eq!(
            game.play(reply),
            Err(LocalMoveError::Board(BoardError::Occupied(reply)))
        );

        play_out(&mut game);
        let board = *game.board();
        assert_eq!(game.play(0), Err(LocalMoveError::GameOver));
        assert_eq!(*game.board(), board);
    }

    #[test]
    fn result_is_recorded_once_and_restart_uses_new_counters() {
        let mut game = game(Difficulty::Softened);
        let winner = play_out(&mut game);
        assert_ne!(winner, Winner::X);
        let _ = game.play(8);
        assert_eq!(game.stats().counters().total_games, 1);

        game.restart();
        assert_eq!(*game.board(), Board::new());
        assert_eq!(game.turn(), Mark::X);
        assert_eq!(game.winner(), None);
        assert_eq!(game.strategy(), Strategy::Minimax);
    }
}
