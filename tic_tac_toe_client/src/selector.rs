//! Computer opponent: exhaustive minimax, with an optional softened mode that
//! gives the human an occasional easier game.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tic_tac_toe_core::{outcome, Board, Mark, Outcome};
use tracing::debug;

pub const CPU: Mark = Mark::O;
pub const HUMAN: Mark = Mark::X;

/// Softened games happen when `total_games % SOFT_GAME_PERIOD == 0`.
pub const SOFT_GAME_PERIOD: u32 = 10;
/// A human winning less than one game in this many gets random moves.
pub const WIN_RATIO_DENOMINATOR: u32 = 33;

/// Center, then corners.
const PREFERENCE: [usize; 5] = [4, 0, 2, 6, 8];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameCounters {
    pub total_games: u32,
    pub human_wins: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Difficulty {
    /// Always minimax.
    Perfect,
    #[default]
    Softened,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Minimax,
    Random,
    Preference,
}

impl Strategy {
    pub fn for_game(difficulty: Difficulty, counters: GameCounters) -> Strategy {
        if difficulty == Difficulty::Perfect || counters.total_games % SOFT_GAME_PERIOD != 0 {
            return Strategy::Minimax;
        }
        // human_wins / total_games < 1 / 33, without dividing by zero games.
        if u64::from(counters.human_wins) * u64::from(WIN_RATIO_DENOMINATOR)
            < u64::from(counters.total_games)
        {
            Strategy::Random
        } else {
            Strategy::Preference
        }
    }
}

fn terminal_score(result: Outcome) -> Option<i32> {
    match result {
        Outcome::Win(Mark::O) => Some(1),
        Outcome::Win(Mark::X) => Some(-1),
        Outcome::Draw => Some(0),
        Outcome::Continue => None,
    }
}

/// Value of `board` for O. `maximizing` is true when O is to move.
pub fn minimax(board: &Board, maximizing: bool) -> i32 {
    if let Some(score) = terminal_score(outcome(board)) {
        return score;
    }

    let mark = if maximizing { CPU } else { HUMAN };
    let scores = board
        .empty_cells()
        .filter_map(|index| board.with(index, mark).ok())
        .map(|next| minimax(&next, !maximizing));

    let best = if maximizing { scores.max() } else { scores.min() };
    best.unwrap_or(0)
}

/// Cell O should take on an undecided board. Ties go to the lowest index.
pub fn best_move(board: &Board) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;
    for index in board.empty_cells() {
        let Ok(next) = board.with(index, CPU) else {
            continue;
        };
        let score = minimax(&next, false);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}

fn preferred_cell(board: &Board) -> Option<usize> {
    PREFERENCE
        .iter()
        .copied()
        .find(|&index| board.is_empty_cell(index))
        .or_else(|| board.empty_cells().next())
}

/// Picks O's moves for one game. The strategy is fixed when the game starts.
#[derive(Debug, Clone)]
pub struct Selector {
    strategy: Strategy,
    rng: ChaCha8Rng,
}

impl Selector {
    pub fn new(difficulty: Difficulty, counters: GameCounters) -> Self {
        let strategy = Strategy::for_game(difficulty, counters);
        let seed = (u64::from(counters.total_games) << 32) | u64::from(counters.human_wins);
        debug!("Selector for game {:?}: {:?}", counters, strategy);
        Selector {
            strategy,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn choose(&mut self, board: &Board) -> Option<usize> {
        match self.strategy {
            Strategy::Minimax => best_move(board),
            Strategy::Preference => preferred_cell(board),
            Strategy::Random => {
                let cells: Vec<usize> = board.empty_cells().collect();
                cells.choose(&mut self.rng).copied()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: Option<Mark> = Some(Mark::X);
    const O: Option<Mark> = Some(Mark::O);
    const E: Option<Mark> = None;

    #[test]
    fn empty_board_resolves_ties_to_first_cell() {
        assert_eq!(minimax(&Board::new(), true), 0);
        assert_eq!(best_move(&Board::new()), Some(0));
    }

    #[test]
    fn takes_an_immediate_win() {
        let board = Board::from_cells([O, O, E, X, X, E, X, E, E]);
        assert_eq!(best_move(&board), Some(2));
    }

    #[test]
    fn blocks_an_open_line() {
        let board = Board::from_cells([X, X, E, E, O, E, E, E, E]);
        assert_eq!(best_move(&board), Some(2));
    }

    #[test]
    fn full_board_has_no_move() {
        let board = Board::from_cells([X, O, X, X, O, O, O, X, X]);
        assert_eq!(best_move(&board), None);
        assert_eq!(minimax(&board, true), 0);
    }

    #[test]
    fn softening_only_applies_every_tenth_game() {
        let counters = |total_games, human_wins| GameCounters {
            total_games,
            human_wins,
        };

        assert_eq!(
            Strategy::for_game(Difficulty::Softened, counters(7, 0)),
            Strategy::Minimax
        );
        assert_eq!(
            Strategy::for_game(Difficulty::Perfect, counters(10, 0)),
            Strategy::Minimax
        );
        // 0 of 10 is below one in 33.
        assert_eq!(
            Strategy::for_game(Difficulty::Softened, counters(10, 0)),
            Strategy::Random
        );
        // 1 of 30 is not.
        assert_eq!(
            Strategy::for_game(Difficulty::Softened, counters(30, 1)),
            Strategy::Preference
        );
        // 1 of 40 is.
        assert_eq!(
            Strategy::for_game(Difficulty::Softened, counters(40, 1)),
            Strategy::Random
        );
        // No history yet is not "below" the threshold.
        assert_eq!(
            Strategy::for_game(Difficulty::Softened, counters(0, 0)),
            Strategy::Preference
        );
    }

    #[test]
    fn preference_order_is_center_then_corners_then_first_free() {
        let mut selector = Selector::new(Difficulty::Softened, GameCounters::default());
        assert_eq!(selector.strategy(), Strategy::Preference);

        assert_eq!(selector.choose(&Board::new()), Some(4));
        let board = Board::from_cells([X, E, E, E, X, E, E, E, E]);
        assert_eq!(selector.choose(&board), Some(2));
        let board = Board::from_cells([X, E, O, E, X, E, O, E, X]);
        assert_eq!(selector.choose(&board), Some(1));
    }

    #[test]
    fn random_mode_is_reproducible_for_equal_counters() {
        let counters = GameCounters {
            total_games: 20,
            human_wins: 0,
        };
        let board = Board::from_cells([X, E, E, E, E, E, E, E, E]);

        let picks = |mut selector: Selector| -> Vec<Option<usize>> {
            (0..5).map(|_| selector.choose(&board)).collect()
        };
        let first = picks(Selector::new(Difficulty::Softened, counters));
        let second = picks(Selector::new(Difficulty::Softened, counters));

        assert_eq!(first, second);
        assert!(first
            .iter()
            .all(|pick| pick.is_some_and(|index| board.is_empty_cell(index))));
    }
}
