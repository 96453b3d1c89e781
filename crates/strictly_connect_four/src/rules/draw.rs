//! Draw detection logic for Connect Four.

use crate::types::{Cell, Grid};
use tracing::instrument;

/// Checks if every cell of the grid holds a disc.
///
/// A full grid with no winner is a draw.
#[instrument(skip(grid))]
pub fn is_full(grid: &Grid) -> bool {
    grid.rows().iter().flatten().all(|cell| *cell != Cell::Empty)
}
