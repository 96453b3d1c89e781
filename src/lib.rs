//! Strictly Games library - Connect Four over WebSocket
//!
//! Two players connect over a persistent WebSocket, claim identity `1` or
//! `2`, and play Connect Four on a 7x6 grid.
//!
//! # Architecture
//!
//! - **Protocol**: command envelopes, payload validation, replies and events
//! - **Room**: one player registry and one game session behind the commands
//! - **Coordinator**: eligibility and end-of-game reactions
//! - **Server**: axum WebSocket transport
//!
//! # Example
//!
//! ```no_run
//! use strictly_games::{ServerConfig, server};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default().with_port(0);
//! let handle = server::start(&config).await?;
//! println!("listening on ws://{}/ws", handle.addr);
//! handle.wait().await
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod coordinator;
mod protocol;
mod room;

pub mod server;

// Crate-level exports - Configuration
pub use config::{ConfigError, DEFAULT_CONFIG_FILE, ServerConfig};

// Crate-level exports - Coordinator
pub use coordinator::Coordinator;

// Crate-level exports - Wire protocol
pub use protocol::{
    Command, CommandError, CommandName, ConnectionId, DisconnectTarget, Envelope, ErrorBody,
    GameEvent, ReplyData, ServerMessage, ValidationDetail, ValidationError,
};

// Crate-level exports - Room
pub use room::{Audience, Broadcast, Dispatch, GameRoom};

// Crate-level exports - Game types (Connect Four)
pub use strictly_connect_four::{
    Cell, Ended, ErrorKind, GameError, GameSession, Grid, HEIGHT, Placement, Player,
    PlayerRegistry, Position, WIDTH,
};
