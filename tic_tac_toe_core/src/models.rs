use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const CELL_COUNT: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => f.write_str("X"),
            Mark::O => f.write_str("O"),
        }
    }
}

/// Result of a finished game as it travels over the wire: a mark or the
/// literal `"draw"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    #[serde(rename = "X")]
    X,
    #[serde(rename = "O")]
    O,
    #[serde(rename = "draw")]
    Draw,
}

impl From<Mark> for Winner {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Winner::X,
            Mark::O => Winner::O,
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::X => f.write_str("X"),
            Winner::O => f.write_str("O"),
            Winner::Draw => f.write_str("draw"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("cell {0} is outside the board")]
    OutOfRange(usize),
    #[error("cell {0} is already taken")]
    Occupied(usize),
}

/// 3x3 board, cells indexed 0..9 in row-major order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board([Option<Mark>; CELL_COUNT]);

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [Option<Mark>; CELL_COUNT]) -> Self {
        Board(cells)
    }

    pub fn cells(&self) -> &[Option<Mark>; CELL_COUNT] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<Mark> {
        self.0.get(index).copied().flatten()
    }

    pub fn is_empty_cell(&self, index: usize) -> bool {
        index < CELL_COUNT && self.0[index].is_none()
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(index, _)| index)
    }

    /// Sets an empty cell. A cell can only be set once until the board is cleared.
    pub fn place(&mut self, index: usize, mark: Mark) -> Result<(), BoardError> {
        match self.0.get_mut(index) {
            None => Err(BoardError::OutOfRange(index)),
            Some(Some(_)) => Err(BoardError::Occupied(index)),
            Some(cell) => {
                *cell = Some(mark);
                Ok(())
            }
        }
    }

    /// Copy of this board with `mark` placed at `index`, used by search.
    pub fn with(&self, index: usize, mark: Mark) -> Result<Board, BoardError> {
        let mut next = *self;
        next.place(index, mark)?;
        Ok(next)
    }

    pub fn clear(&mut self) {
        self.0 = [None; CELL_COUNT];
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            let line: Vec<String> = (0..3)
                .map(|col| {
                    let index = row * 3 + col;
                    match self.0[index] {
                        Some(mark) => mark.to_string(),
                        None => (index + 1).to_string(),
                    }
                })
                .collect();
            writeln!(f, " {} ", line.join(" | "))?;
            if row < 2 {
                writeln!(f, "---+---+---")?;
            }
        }
        Ok(())
    }
}
