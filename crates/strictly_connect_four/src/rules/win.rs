//! Win detection logic for Connect Four.
//!
//! A win is four consecutive discs of one player on any line through the
//! last move. Each line is extracted whole (full row, full column, both
//! full diagonals clipped to the grid) and scanned for a run of four, so a
//! run that merely passes through the last move is found as well as one
//! that starts or ends there.

use crate::types::{Cell, Grid, Player, Position, HEIGHT, WIDTH};
use tracing::{debug, instrument};

/// Number of aligned discs needed to win.
pub const STREAK: usize = 4;

/// Cells of the row through `at`, left to right.
pub fn horizontal(grid: &Grid, at: Position) -> Vec<Cell> {
    grid.rows()[at.row].to_vec()
}

/// Cells of the column through `at`, top to bottom.
pub fn vertical(grid: &Grid, at: Position) -> Vec<Cell> {
    grid.rows().iter().map(|row| row[at.column]).collect()
}

/// Cells of the "/" diagonal through `at`, top to bottom.
///
/// The cell on row `i` sits in column `at.column + at.row - i`.
pub fn slash_diagonal(grid: &Grid, at: Position) -> Vec<Cell> {
    diagonal(grid, |i| at.column as isize + at.row as isize - i as isize)
}

/// Cells of the "\" diagonal through `at`, top to bottom.
///
/// The cell on row `i` sits in column `at.column - at.row + i`.
pub fn backslash_diagonal(grid: &Grid, at: Position) -> Vec<Cell> {
    diagonal(grid, |i| at.column as isize - at.row as isize + i as isize)
}

fn diagonal(grid: &Grid, column_of: impl Fn(usize) -> isize) -> Vec<Cell> {
    (0..HEIGHT)
        .filter_map(|i| {
            let column = column_of(i);
            if (0..WIDTH as isize).contains(&column) {
                Some(grid.rows()[i][column as usize])
            } else {
                None
            }
        })
        .collect()
}

/// Checks whether `line` holds `STREAK` consecutive discs of `player`.
pub fn has_streak(line: &[Cell], player: Player) -> bool {
    line.windows(STREAK)
        .any(|window| window.iter().all(|cell| *cell == Cell::Occupied(player)))
}

/// Checks whether the disc at `at` belongs to a winning line.
///
/// Returns the owner of that disc when it does, `None` when the cell is
/// empty or no line through it holds four in a row.
#[instrument(skip(grid))]
pub fn is_winning_at(grid: &Grid, at: Position) -> Option<Player> {
    let player = grid.get(at.row, at.column)?.player()?;

    let won = [
        horizontal(grid, at),
        vertical(grid, at),
        slash_diagonal(grid, at),
        backslash_diagonal(grid, at),
    ]
    .iter()
    .any(|line| has_streak(line, player));

    debug!(%player, won, "Evaluated lines through last move");
    won.then_some(player)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(discs: &[(usize, usize, Player)]) -> Grid {
        let mut grid = Grid::new();
        for &(row, column, player) in discs {
            grid.place(Position::new(row, column), player);
        }
        grid
    }

    #[test]
    fn test_empty_cell_never_wins() {
        let grid = Grid::new();
        assert_eq!(is_winning_at(&grid, Position::new(6, 0)), None);
    }

    #[test]
    fn test_vertical_four() {
        let grid = grid_with(&[
            (6, 0, Player::One),
            (5, 0, Player::One),
            (4, 0, Player::One),
            (3, 0, Player::One),
        ]);
        assert_eq!(is_winning_at(&grid, Position::new(3, 0)), Some(Player::One));
    }

    #[test]
    fn test_three_is_not_enough() {
        let grid = grid_with(&[
            (6, 2, Player::Two),
            (6, 3, Player::Two),
            (6, 4, Player::Two),
        ]);
        assert_eq!(is_winning_at(&grid, Position::new(6, 4)), None);
    }

    #[test]
    fn test_broken_run_is_not_a_win() {
        let grid = grid_with(&[
            (6, 0, Player::One),
            (6, 1, Player::One),
            (6, 2, Player::Two),
            (6, 3, Player::One),
            (6, 4, Player::One),
        ]);
        assert_eq!(is_winning_at(&grid, Position::new(6, 4)), None);
    }

    #[test]
    fn test_run_through_middle_of_line() {
        // Last move at column 2 completes 0..=3 without being an end of the run.
        let grid = grid_with(&[
            (6, 0, Player::Two),
            (6, 1, Player::Two),
            (6, 3, Player::Two),
            (6, 2, Player::Two),
        ]);
        assert_eq!(is_winning_at(&grid, Position::new(6, 2)), Some(Player::Two));
    }

    #[test]
    fn test_slash_diagonal_cells() {
        let grid = Grid::new();
        // Through (6, 0): columns 6 - i for rows 0..7, in range for rows 1..=6.
        assert_eq!(slash_diagonal(&grid, Position::new(6, 0)).len(), 6);
        // Through (0, 0): only the corner itself.
        assert_eq!(slash_diagonal(&grid, Position::new(0, 0)).len(), 1);
    }

    #[test]
    fn test_slash_diagonal_win() {
        let grid = grid_with(&[
            (6, 0, Player::One),
            (5, 1, Player::One),
            (4, 2, Player::One),
            (3, 3, Player::One),
        ]);
        assert_eq!(is_winning_at(&grid, Position::new(5, 1)), Some(Player::One));
    }

    #[test]
    fn test_backslash_diagonal_win() {
        let grid = grid_with(&[
            (3, 2, Player::Two),
            (4, 3, Player::Two),
            (5, 4, Player::Two),
            (6, 5, Player::Two),
        ]);
        assert_eq!(is_winning_at(&grid, Position::new(3, 2)), Some(Player::Two));
    }

    #[test]
    fn test_other_players_line_ignored() {
        let grid = grid_with(&[
            (6, 0, Player::Two),
            (6, 1, Player::Two),
            (6, 2, Player::Two),
            (6, 3, Player::Two),
            (5, 0, Player::One),
        ]);
        assert_eq!(is_winning_at(&grid, Position::new(5, 0)), None);
    }
}
