//! Core domain types for Connect Four.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of rows in the grid. Row 0 is the top, row `HEIGHT - 1` the bottom.
pub const HEIGHT: usize = 7;

/// Number of columns in the grid.
pub const WIDTH: usize = 6;

/// Player identity. Exactly two exist and neither is ever created or destroyed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    Serialize,
    Deserialize,
    strum::EnumIter,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Player {
    /// Player `1` (moves first).
    #[display("1")]
    One,
    /// Player `2`.
    #[display("2")]
    Two,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Parses a wire token (`1` or `2`).
    pub fn from_token(token: i64) -> Option<Self> {
        match token {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }

    /// Returns the wire token of this player.
    pub fn token(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> Self {
        player.token()
    }
}

/// Rejected player token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("invalid player token {}, expected 1 or 2", _0)]
pub struct InvalidPlayerToken(pub u8);

impl std::error::Error for InvalidPlayerToken {}

impl TryFrom<u8> for Player {
    type Error = InvalidPlayerToken;

    fn try_from(token: u8) -> Result<Self, Self::Error> {
        Player::from_token(i64::from(token)).ok_or(InvalidPlayerToken(token))
    }
}

/// A cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Cell {
    /// No disc.
    #[default]
    Empty,
    /// Disc of the given player.
    Occupied(Player),
}

impl Cell {
    /// Returns the player occupying this cell, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(player) => Some(player),
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => 0,
            Cell::Occupied(player) => player.token(),
        }
    }
}

impl TryFrom<u8> for Cell {
    type Error = InvalidPlayerToken;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Cell::Empty),
            token => Player::try_from(token).map(Cell::Occupied),
        }
    }
}

/// Coordinates of a disc on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "[usize; 2]", from = "[usize; 2]")]
pub struct Position {
    /// Row index, 0 at the top.
    pub row: usize,
    /// Column index, 0 at the left.
    pub column: usize,
}

impl Position {
    /// Creates a new position.
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl From<Position> for [usize; 2] {
    fn from(position: Position) -> Self {
        [position.row, position.column]
    }
}

impl From<[usize; 2]> for Position {
    fn from([row, column]: [usize; 2]) -> Self {
        Self { row, column }
    }
}

/// The 7x6 Connect Four grid, filled bottom-up.
///
/// Serializes as seven rows of six integers: `0` for an empty cell, the
/// player token otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    cells: [[Cell; WIDTH]; HEIGHT],
}

impl Grid {
    /// Creates an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the cell at the given coordinates.
    pub fn get(&self, row: usize, column: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(column)).copied()
    }

    /// Returns the cells row by row, top row first.
    pub fn rows(&self) -> &[[Cell; WIDTH]; HEIGHT] {
        &self.cells
    }

    /// Returns the lowest empty row of `column`, or `None` when the column
    /// is full or out of range.
    pub fn landing_row(&self, column: usize) -> Option<usize> {
        if column >= WIDTH {
            return None;
        }
        (0..HEIGHT).rev().find(|&row| self.cells[row][column] == Cell::Empty)
    }

    /// Checks whether the top cell of `column` is occupied.
    pub fn is_column_full(&self, column: usize) -> bool {
        matches!(self.get(0, column), Some(Cell::Occupied(_)))
    }

    /// Number of discs on the grid.
    pub fn disc_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell != Cell::Empty)
            .count()
    }

    pub(crate) fn place(&mut self, position: Position, player: Player) {
        self.cells[position.row][position.column] = Cell::Occupied(player);
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.cells.iter().enumerate() {
            let line: String = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => '.',
                    Cell::Occupied(Player::One) => '1',
                    Cell::Occupied(Player::Two) => '2',
                })
                .collect();
            f.write_str(&line)?;
            if index + 1 < HEIGHT {
                f.write_str("\n")?;
            }
        }
        Ok(())
    }
}
