//! Game rules for Connect Four.
//!
//! Pure functions evaluating a grid. Rules are kept apart from the session
//! so they can be tested against hand-built grids.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{backslash_diagonal, has_streak, horizontal, is_winning_at, slash_diagonal, vertical};
