//! Pure Connect Four game logic.
//!
//! - [`PlayerRegistry`] tracks which of the two players are connected.
//! - [`GameSession`] owns the grid, the turn and the game lifecycle.
//! - [`rules`] holds the win and draw checks.
//!
//! Nothing here performs I/O; the server crate wires these pieces to a
//! transport.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod game;
mod registry;
mod types;

pub mod rules;

pub use error::{ErrorKind, GameError};
pub use game::{Ended, GameSession, Placement};
pub use registry::PlayerRegistry;
pub use types::{Cell, Grid, HEIGHT, InvalidPlayerToken, Player, Position, WIDTH};
