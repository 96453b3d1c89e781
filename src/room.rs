//! Game room: command handling for one registry and one session.
//!
//! A room turns each inbound command into exactly one reply for the caller
//! plus any number of broadcasts. It never touches a socket; the server
//! delivers what [`Dispatch`] describes.

use crate::coordinator::Coordinator;
use crate::protocol::{
    Command, CommandError, ConnectionId, DisconnectTarget, Envelope, GameEvent, ReplyData,
    ServerMessage,
};
use derive_getters::Getters;
use derive_new::new;
use serde_json::Value;
use strictly_connect_four::{GameError, GameSession, Player, PlayerRegistry};
use tracing::{debug, info, instrument, warn};

/// Who receives a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Every open connection, the caller included.
    All,
    /// Every open connection except the caller.
    Others,
}

/// An event and who should receive it.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Broadcast {
    /// Recipients.
    pub audience: Audience,
    /// Event to deliver.
    pub event: GameEvent,
}

/// Everything produced by one command.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    /// Reply for the caller.
    pub reply: ServerMessage,
    /// Events for other parties, in delivery order.
    pub broadcasts: Vec<Broadcast>,
}

type Outcome = Result<(ReplyData, Vec<Broadcast>), CommandError>;

/// One Connect Four room: the player registry and the game session.
#[derive(Debug, Clone, Default, Getters)]
pub struct GameRoom {
    registry: PlayerRegistry<ConnectionId>,
    session: GameSession,
}

impl GameRoom {
    /// Creates an empty room.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating game room");
        Self::default()
    }

    /// Parses and handles a raw text frame.
    #[instrument(skip(self, text), fields(%caller))]
    pub fn handle_frame(&mut self, caller: ConnectionId, text: &str) -> Dispatch {
        match Envelope::from_frame(text) {
            Ok(envelope) => self.handle_envelope(caller, envelope),
            Err(e) => {
                warn!("Unparsable frame");
                Self::rejected(None, CommandError::from(e))
            }
        }
    }

    /// Validates and handles one envelope.
    #[instrument(skip(self, envelope), fields(%caller, command = %envelope.command))]
    pub fn handle_envelope(&mut self, caller: ConnectionId, envelope: Envelope) -> Dispatch {
        match Command::parse(&envelope) {
            Ok(command) => self.handle(caller, envelope.id, command),
            Err(e) => {
                warn!(error = %e, details = ?e.details, "Invalid payload");
                Self::rejected(envelope.id, CommandError::from(e))
            }
        }
    }

    /// Handles a validated command.
    ///
    /// On failure the registry and session are left untouched and nothing
    /// is broadcast.
    #[instrument(skip(self, id), fields(%caller))]
    pub fn handle(&mut self, caller: ConnectionId, id: Option<Value>, command: Command) -> Dispatch {
        let outcome = match command {
            Command::Connect { player } => self.connect(caller, player),
            Command::Disconnect(target) => self.disconnect(target),
            Command::ListConnected => Ok((
                ReplyData::Identities {
                    identities: self.registry.find_all(),
                },
                Vec::new(),
            )),
            Command::StartGame => self.start(caller),
            Command::ResetGame { player } => self.reset(player),
            Command::DropDisc { player, column } => self.drop_disc(player, column),
        };

        match outcome {
            Ok((data, broadcasts)) => Dispatch {
                reply: ServerMessage::reply(id, &Ok(data)),
                broadcasts,
            },
            Err(e) => {
                warn!(error = %e, kind = %e.kind(), "Command rejected");
                Self::rejected(id, e)
            }
        }
    }

    /// Unregisters whoever was connected through a closed connection.
    #[instrument(skip(self), fields(%caller))]
    pub fn connection_closed(&mut self, caller: ConnectionId) -> Vec<Broadcast> {
        match self.registry.disconnect_by_handle(&caller) {
            Ok(player) => {
                info!(%player, "Connection closed, player removed");
                self.after_registry_change(player_left(player))
            }
            Err(_) => {
                debug!("Closed connection was not a player");
                Vec::new()
            }
        }
    }

    fn rejected(id: Option<Value>, error: CommandError) -> Dispatch {
        Dispatch {
            reply: ServerMessage::reply(id, &Err(error)),
            broadcasts: Vec::new(),
        }
    }

    fn after_registry_change(&mut self, mut broadcasts: Vec<Broadcast>) -> Vec<Broadcast> {
        broadcasts.extend(
            Coordinator::after_registry_change(&self.registry, &mut self.session)
                .into_iter()
                .map(|event| Broadcast::new(Audience::All, event)),
        );
        broadcasts
    }

    fn connect(&mut self, caller: ConnectionId, player: Player) -> Outcome {
        self.registry.connect(player, caller)?;
        let broadcasts = self.after_registry_change(vec![Broadcast::new(
            Audience::Others,
            GameEvent::PlayerConnected {
                identity: player,
                connection_handle: caller,
            },
        )]);
        Ok((
            ReplyData::Connected {
                assigned_identity: player,
                connection_handle: caller,
            },
            broadcasts,
        ))
    }

    fn disconnect(&mut self, target: DisconnectTarget) -> Outcome {
        let player = match target {
            DisconnectTarget::Player(player) => self.registry.disconnect_by_player(player)?,
            DisconnectTarget::Handle(handle) => self.registry.disconnect_by_handle(&handle)?,
        };
        let broadcasts = self.after_registry_change(player_left(player));
        Ok((ReplyData::Disconnected { identity: player }, broadcasts))
    }

    fn start(&mut self, caller: ConnectionId) -> Outcome {
        let player = self.registry.find_by_handle(&caller)?;
        if !self.session.is_started() && !self.session.is_enabled() {
            return Err(GameError::NotEligible.into());
        }
        let turn = self.session.start()?;
        info!(%player, %turn, "Game started by player");
        Ok((
            ReplyData::Turn { turn },
            vec![Broadcast::new(Audience::Others, GameEvent::GameStarted { turn })],
        ))
    }

    fn reset(&mut self, player: Player) -> Outcome {
        let turn = self.session.reset()?;
        info!(%player, %turn, "Game reset by player");
        Ok((
            ReplyData::Turn { turn },
            vec![Broadcast::new(Audience::Others, GameEvent::GameReset { turn })],
        ))
    }

    fn drop_disc(&mut self, player: Player, column: i64) -> Outcome {
        let placement = self.session.play(player, column)?;
        let mut broadcasts = vec![Broadcast::new(
            Audience::Others,
            GameEvent::GamePlayed(placement.clone()),
        )];
        broadcasts.extend(
            Coordinator::after_drop(&mut self.session)
                .into_iter()
                .map(|event| Broadcast::new(Audience::All, event)),
        );
        Ok((ReplyData::Played(placement), broadcasts))
    }
}

fn player_left(player: Player) -> Vec<Broadcast> {
    vec![Broadcast::new(
        Audience::Others,
        GameEvent::PlayerDisconnected { identity: player },
    )]
}
