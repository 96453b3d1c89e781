//! Game session: grid, turn order and lifecycle of a single Connect Four game.

use crate::error::GameError;
use crate::rules;
use crate::types::{Grid, Player, Position, HEIGHT, WIDTH};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Result of a successful drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Player whose turn it is after the drop.
    pub turn: Player,
    /// Where the disc landed.
    pub position: Position,
    /// The grid after the drop.
    pub grid: Grid,
}

/// Acknowledgment returned by [`GameSession::end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ended {
    /// Always true.
    pub ended: bool,
}

/// A single Connect Four game.
///
/// Lifecycle is `NotStarted -> Started -> NotStarted`; `reset` keeps a
/// started game started. The grid, turn and last move are re-initialized
/// on every transition. All mutation goes through the methods below.
#[derive(Debug, Clone)]
pub struct GameSession {
    grid: Grid,
    turn: Player,
    last_move: Option<Position>,
    moves_remaining: usize,
    started: bool,
    enabled: bool,
}

impl GameSession {
    /// Creates a session that has not been started.
    #[instrument]
    pub fn new() -> Self {
        Self {
            grid: Grid::new(),
            turn: Player::One,
            last_move: None,
            moves_remaining: HEIGHT * WIDTH,
            started: false,
            enabled: false,
        }
    }

    fn reinitialize(&mut self) {
        self.grid = Grid::new();
        self.turn = Player::One;
        self.last_move = None;
        self.moves_remaining = HEIGHT * WIDTH;
    }

    /// Starts the game. Returns the player who moves first.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> Result<Player, GameError> {
        if self.started {
            warn!("Start requested on a started game");
            return Err(GameError::AlreadyStarted);
        }
        self.reinitialize();
        self.started = true;
        info!(turn = %self.turn, "Game started");
        Ok(self.turn)
    }

    /// Clears the grid of a started game. Returns the player who moves first.
    #[instrument(skip(self))]
    pub fn reset(&mut self) -> Result<Player, GameError> {
        if !self.started {
            warn!("Reset requested before start");
            return Err(GameError::NotStarted);
        }
        self.reinitialize();
        info!(turn = %self.turn, "Game reset");
        Ok(self.turn)
    }

    /// Ends a started game.
    #[instrument(skip(self))]
    pub fn end(&mut self) -> Result<Ended, GameError> {
        if !self.started {
            warn!("End requested before start");
            return Err(GameError::NotStarted);
        }
        self.started = false;
        self.reinitialize();
        info!("Game ended");
        Ok(Ended { ended: true })
    }

    /// Returns true between `start` and `end`.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Fails unless it is `player`'s turn.
    #[instrument(skip(self))]
    pub fn check_turn(&self, player: Player) -> Result<(), GameError> {
        if player == self.turn {
            Ok(())
        } else {
            debug!(%player, turn = %self.turn, "Out of turn");
            Err(GameError::NotPlayersTurn(player))
        }
    }

    /// Drops a disc for `player` into `column`.
    ///
    /// The disc lands in the lowest empty row and the turn passes to the
    /// opponent of `player`. Turn order is not checked here; see [`play`].
    ///
    /// # Errors
    ///
    /// - `NotStarted` if the game has not been started.
    /// - `InvalidColumn` if `column` is outside `0..WIDTH` or full.
    ///
    /// [`play`]: GameSession::play
    #[instrument(skip(self))]
    pub fn drop_disc(&mut self, player: Player, column: i64) -> Result<Placement, GameError> {
        if !self.started {
            return Err(GameError::NotStarted);
        }

        let row_column = usize::try_from(column)
            .ok()
            .and_then(|c| self.grid.landing_row(c).map(|row| (row, c)));
        let Some((row, col)) = row_column else {
            warn!(%player, column, "Rejected drop");
            return Err(GameError::InvalidColumn(column));
        };

        let position = Position::new(row, col);
        self.grid.place(position, player);
        self.last_move = Some(position);
        self.moves_remaining -= 1;
        self.turn = player.opponent();

        info!(
            %player,
            row,
            column = col,
            next = %self.turn,
            moves_remaining = self.moves_remaining,
            "Disc dropped"
        );
        debug!(grid = %self.grid, "Grid after drop");

        Ok(Placement {
            turn: self.turn,
            position,
            grid: self.grid.clone(),
        })
    }

    /// Checks the turn and drops the disc in one step.
    ///
    /// Holding `&mut self` across both checks means no other move can land
    /// between the turn check and the drop.
    #[instrument(skip(self))]
    pub fn play(&mut self, player: Player, column: i64) -> Result<Placement, GameError> {
        if !self.started {
            return Err(GameError::NotStarted);
        }
        self.check_turn(player)?;
        self.drop_disc(player, column)
    }

    /// Returns true when the last disc dropped completes four in a row.
    pub fn is_winning(&self) -> bool {
        self.last_move
            .and_then(|at| rules::is_winning_at(&self.grid, at))
            .is_some()
    }

    /// Owner of the last disc dropped; `None` before the first drop.
    pub fn last_winner(&self) -> Option<Player> {
        let at = self.last_move?;
        self.grid.get(at.row, at.column)?.player()
    }

    /// Returns true when the grid filled up without a winner.
    pub fn is_draw(&self) -> bool {
        let full = rules::is_full(&self.grid);
        debug_assert_eq!(full, self.moves_remaining == 0, "move counter out of step with grid");
        full && !self.is_winning()
    }

    /// Player whose turn it is.
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// Current grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Coordinates of the last disc dropped.
    pub fn last_move(&self) -> Option<Position> {
        self.last_move
    }

    /// Drops left before the grid is full.
    pub fn moves_remaining(&self) -> usize {
        self.moves_remaining
    }

    /// Marks the game as startable (both players present).
    #[instrument(skip(self))]
    pub fn enable(&mut self) {
        self.enabled = true;
        info!("Game enabled");
    }

    /// Clears the startable flag.
    #[instrument(skip(self))]
    pub fn disable(&mut self) {
        self.enabled = false;
        info!("Game disabled");
    }

    /// Returns true while both players are present.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
