//! Errors returned by registry and session operations.

use crate::types::Player;
use derive_more::Display;
use serde::Serialize;

/// Category of a caller-facing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing payload fields.
    #[display("validation")]
    Validation,
    /// The request conflicts with the current state.
    #[display("conflict")]
    Conflict,
    /// The target of the request does not exist.
    #[display("not_found")]
    NotFound,
    /// The caller moved out of turn.
    #[display("turn")]
    Turn,
    /// The move itself is illegal.
    #[display("invalid_move")]
    InvalidMove,
}

/// Failure of a registry or session operation.
///
/// Every variant is recoverable: the operation that produced it left the
/// registry and session exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GameError {
    /// The player already has a live connection.
    #[display("player {} is already connected", _0)]
    AlreadyConnected(Player),

    /// The connection is already registered as another player.
    #[display("connection is already registered as player {}", _0)]
    HandleInUse(Player),

    /// `start` was called on a started game.
    #[display("game already started")]
    AlreadyStarted,

    /// `start` was called before both players connected.
    #[display("game is not enabled, waiting for two players")]
    NotEligible,

    /// No registry entry matches the given key.
    #[display("player not found")]
    NotFound,

    /// The game has not been started yet.
    #[display("game not started yet")]
    NotStarted,

    /// It is the other player's turn.
    #[display("it's not player {}'s turn", _0)]
    NotPlayersTurn(Player),

    /// The column is out of range or full.
    #[display("invalid column {}", _0)]
    InvalidColumn(i64),
}

impl std::error::Error for GameError {}

impl GameError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::AlreadyConnected(_)
            | GameError::HandleInUse(_)
            | GameError::AlreadyStarted
            | GameError::NotEligible => ErrorKind::Conflict,
            GameError::NotFound | GameError::NotStarted => ErrorKind::NotFound,
            GameError::NotPlayersTurn(_) => ErrorKind::Turn,
            GameError::InvalidColumn(_) => ErrorKind::InvalidMove,
        }
    }

    /// Returns the stable wire code of this error.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::AlreadyConnected(_) => "ALREADY_CONNECTED",
            GameError::HandleInUse(_) => "HANDLE_IN_USE",
            GameError::AlreadyStarted => "ALREADY_STARTED",
            GameError::NotEligible => "NOT_ELIGIBLE",
            GameError::NotFound => "NOT_FOUND",
            GameError::NotStarted => "NOT_STARTED",
            GameError::NotPlayersTurn(_) => "NOT_PLAYERS_TURN",
            GameError::InvalidColumn(_) => "INVALID_COLUMN",
        }
    }
}
