use crate::models::{Board, Mark, Winner};

/// Winning lines in scan order: rows, then columns, then diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Win(Mark),
    Draw,
}

impl Outcome {
    pub fn is_decided(self) -> bool {
        !matches!(self, Outcome::Continue)
    }

    pub fn winner(self) -> Option<Winner> {
        match self {
            Outcome::Continue => None,
            Outcome::Win(mark) => Some(mark.into()),
            Outcome::Draw => Some(Winner::Draw),
        }
    }
}

/// Mark on the first fully matched line, if any.
pub fn winner(board: &Board) -> Option<Mark> {
    LINES.iter().find_map(|&[a, b, c]| {
        let mark = board.get(a)?;
        (board.get(b) == Some(mark) && board.get(c) == Some(mark)).then_some(mark)
    })
}

pub fn is_full(board: &Board) -> bool {
    board.cells().iter().all(|cell| cell.is_some())
}

/// A matched line wins even on a full board.
pub fn outcome(board: &Board) -> Outcome {
    if let Some(mark) = winner(board) {
        Outcome::Win(mark)
    } else if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: Option<Mark> = Some(Mark::X);
    const O: Option<Mark> = Some(Mark::O);
    const E: Option<Mark> = None;

    #[test]
    fn empty_board_continues() {
        assert_eq!(outcome(&Board::new()), Outcome::Continue);
        assert!(!is_full(&Board::new()));
    }

    #[test]
    fn two_in_a_row_then_completed_line() {
        let mut board = Board::from_cells([X, X, E, O, O, E, E, E, E]);
        assert_eq!(outcome(&board), Outcome::Continue);

        board.place(2, Mark::X).unwrap();
        assert_eq!(outcome(&board), Outcome::Win(Mark::X));
    }

    #[test]
    fn every_line_is_detected() {
        for line in LINES {
            let mut board = Board::new();
            for index in line {
                board.place(index, Mark::O).unwrap();
            }
            assert_eq!(winner(&board), Some(Mark::O), "line {:?}", line);
        }
    }

    #[test]
    fn full_board_without_line_is_draw() {
        let board = Board::from_cells([X, O, X, X, O, O, O, X, X]);
        assert!(is_full(&board));
        assert_eq!(outcome(&board), Outcome::Draw);
        assert_eq!(outcome(&board).winner(), Some(Winner::Draw));
    }

    #[test]
    fn full_board_with_line_is_win_not_draw() {
        let board = Board::from_cells([X, X, X, O, O, X, X, O, O]);
        assert!(is_full(&board));
        assert_eq!(outcome(&board), Outcome::Win(Mark::X));
    }

    #[test]
    fn first_line_in_scan_order_is_reported() {
        // Not a reachable position: row 0 is scanned before row 2.
        let board = Board::from_cells([X, X, X, E, E, E, O, O, O]);
        assert_eq!(winner(&board), Some(Mark::X));
    }
}
