//! Wire protocol: command envelopes, payload validation, replies and events.
//!
//! Every inbound text frame is an [`Envelope`]. Its payload is validated
//! into a [`Command`] before anything touches game state; validation
//! failures carry one [`ValidationDetail`] per offending field.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use strictly_connect_four::{Ended, ErrorKind, GameError, Placement, Player};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Opaque handle of one WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Allocates a fresh random handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ConnectionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Inbound frame as sent by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Correlation id echoed back in the reply.
    #[serde(default)]
    pub id: Option<Value>,
    /// Command name, e.g. `dropDisc`.
    pub command: String,
    /// Command arguments.
    #[serde(default)]
    pub payload: Value,
}

/// Names of the commands a client may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum CommandName {
    /// Register as a player.
    Connect,
    /// Unregister a player.
    Disconnect,
    /// List connected players.
    ListConnected,
    /// Start the game.
    StartGame,
    /// Clear the grid of a started game.
    ResetGame,
    /// Drop a disc.
    DropDisc,
}

/// Who to unregister on `disconnect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectTarget {
    /// By player identity.
    Player(Player),
    /// By connection handle.
    Handle(ConnectionId),
}

/// A validated command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Register the calling connection as `player`.
    Connect {
        /// Requested identity.
        player: Player,
    },
    /// Unregister a player.
    Disconnect(DisconnectTarget),
    /// List connected players.
    ListConnected,
    /// Start the game as the player registered on the calling connection.
    StartGame,
    /// Reset the game.
    ResetGame {
        /// Requesting player.
        player: Player,
    },
    /// Drop a disc.
    DropDisc {
        /// Player dropping the disc.
        player: Player,
        /// Target column; bounds are checked by the session.
        column: i64,
    },
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDetail {
    /// Human-readable description.
    pub message: String,
    /// Path of the offending field.
    pub path: Vec<String>,
    /// Violated rule, e.g. `any.required`.
    #[serde(rename = "type")]
    pub rule: String,
}

impl ValidationDetail {
    fn new(path: &str, rule: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: vec![path.to_string()],
            rule: rule.to_string(),
        }
    }
}

/// Rejected payload.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("invalid payload")]
pub struct ValidationError {
    /// Every problem found.
    pub details: Vec<ValidationDetail>,
}

impl std::error::Error for ValidationError {}

impl From<ValidationDetail> for ValidationError {
    fn from(detail: ValidationDetail) -> Self {
        Self {
            details: vec![detail],
        }
    }
}

/// Failure of a single command.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum CommandError {
    /// The payload was malformed.
    #[display("{}", _0)]
    Validation(ValidationError),
    /// The registry or session refused the operation.
    #[display("{}", _0)]
    Game(GameError),
}

impl std::error::Error for CommandError {}

impl CommandError {
    /// Category of the failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::Validation(_) => ErrorKind::Validation,
            CommandError::Game(e) => e.kind(),
        }
    }
}

impl Envelope {
    /// Parses a raw text frame.
    pub fn from_frame(text: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(text).map_err(|e| {
            ValidationDetail::new("command", "frame.parse", format!("malformed frame: {}", e)).into()
        })
    }
}

impl Command {
    /// Validates an envelope into a command.
    #[instrument(skip(envelope), fields(command = %envelope.command))]
    pub fn parse(envelope: &Envelope) -> Result<Self, ValidationError> {
        let name = CommandName::from_str(&envelope.command).map_err(|_| {
            ValidationDetail::new(
                "command",
                "any.only",
                format!("\"command\" must be one of the known commands, got \"{}\"", envelope.command),
            )
        })?;

        let empty = Map::new();
        let payload = match &envelope.payload {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => {
                return Err(ValidationDetail::new(
                    "payload",
                    "object.base",
                    "\"payload\" must be of type object",
                )
                .into());
            }
        };

        let command = match name {
            CommandName::Connect => Command::Connect {
                player: required(identity(payload, "identity"), "identity")?,
            },
            CommandName::Disconnect => Command::Disconnect(disconnect_target(payload)?),
            CommandName::ListConnected => Command::ListConnected,
            CommandName::StartGame => Command::StartGame,
            CommandName::ResetGame => Command::ResetGame {
                player: required(identity(payload, "identity"), "identity")?,
            },
            CommandName::DropDisc => {
                let player = required(identity(payload, "identity"), "identity");
                let column = required(integer(payload, "column"), "column");
                match (player, column) {
                    (Ok(player), Ok(column)) => Command::DropDisc { player, column },
                    (player, column) => {
                        let details = [player.err(), column.err()]
                            .into_iter()
                            .flatten()
                            .flat_map(|e| e.details)
                            .collect();
                        return Err(ValidationError { details });
                    }
                }
            }
        };

        debug!(?command, "Command validated");
        Ok(command)
    }
}

fn required<T>(
    field: Result<Option<T>, ValidationDetail>,
    key: &str,
) -> Result<T, ValidationError> {
    match field {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(ValidationDetail::new(
            key,
            "any.required",
            format!("\"{}\" is required", key),
        )
        .into()),
        Err(detail) => Err(detail.into()),
    }
}

fn identity(payload: &Map<String, Value>, key: &str) -> Result<Option<Player>, ValidationDetail> {
    let Some(value) = payload.get(key) else {
        return Ok(None);
    };
    let Some(number) = value.as_f64() else {
        return Err(ValidationDetail::new(
            key,
            "number.base",
            format!("\"{}\" must be a number", key),
        ));
    };
    whole_number(value)
        .and_then(Player::from_token)
        .map(Some)
        .ok_or_else(|| {
            ValidationDetail::new(
                key,
                "any.only",
                format!("\"{}\" must be one of [1, 2], got {}", key, number),
            )
        })
}

fn integer(payload: &Map<String, Value>, key: &str) -> Result<Option<i64>, ValidationDetail> {
    let Some(value) = payload.get(key) else {
        return Ok(None);
    };
    if !value.is_number() {
        return Err(ValidationDetail::new(
            key,
            "number.base",
            format!("\"{}\" must be a number", key),
        ));
    }
    whole_number(value).map(Some).ok_or_else(|| {
        ValidationDetail::new(
            key,
            "number.integer",
            format!("\"{}\" must be an integer", key),
        )
    })
}

/// Integer value of a JSON number, accepting integral floats such as `2.0`.
fn whole_number(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.is_finite() && n.fract() == 0.0)
            .map(|n| n as i64)
    })
}

fn disconnect_target(payload: &Map<String, Value>) -> Result<DisconnectTarget, ValidationError> {
    if let Some(player) = identity(payload, "identity")? {
        return Ok(DisconnectTarget::Player(player));
    }
    match payload.get("connectionHandle") {
        Some(Value::String(raw)) => raw.parse().map(DisconnectTarget::Handle).map_err(|_| {
            ValidationDetail::new(
                "connectionHandle",
                "string.guid",
                "\"connectionHandle\" must be a valid GUID",
            )
            .into()
        }),
        Some(_) => Err(ValidationDetail::new(
            "connectionHandle",
            "string.base",
            "\"connectionHandle\" must be a string",
        )
        .into()),
        None => Err(ValidationDetail::new(
            "value",
            "object.missing",
            "\"value\" must contain at least one of [identity, connectionHandle]",
        )
        .into()),
    }
}

/// Success data of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyData {
    /// `connect` succeeded.
    Connected {
        /// Identity now bound to the caller.
        #[serde(rename = "assignedIdentity")]
        assigned_identity: Player,
        /// Handle of the calling connection, usable with `disconnect`.
        #[serde(rename = "connectionHandle")]
        connection_handle: ConnectionId,
    },
    /// `disconnect` succeeded.
    Disconnected {
        /// Identity that was removed.
        identity: Player,
    },
    /// `listConnected` result.
    Identities {
        /// Connected identities, ascending.
        identities: Vec<Player>,
    },
    /// `startGame` or `resetGame` succeeded.
    Turn {
        /// Player who moves next.
        turn: Player,
    },
    /// `dropDisc` succeeded.
    Played(Placement),
}

/// Error body of a failed reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Failure category.
    pub kind: ErrorKind,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Field-level details for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationDetail>>,
}

impl From<&CommandError> for ErrorBody {
    fn from(error: &CommandError) -> Self {
        match error {
            CommandError::Validation(e) => Self {
                kind: ErrorKind::Validation,
                code: "INVALID_PAYLOAD",
                message: e.to_string(),
                details: Some(e.details.clone()),
            },
            CommandError::Game(e) => Self {
                kind: e.kind(),
                code: e.code(),
                message: e.to_string(),
                details: None,
            },
        }
    }
}

/// Event pushed to connected parties without a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum GameEvent {
    /// A player registered.
    PlayerConnected {
        /// The new player.
        identity: Player,
        /// Handle the player is connected through.
        #[serde(rename = "connectionHandle")]
        connection_handle: ConnectionId,
    },
    /// A player left.
    PlayerDisconnected {
        /// The departed player.
        identity: Player,
    },
    /// Both players are present; the game may start.
    EligibilityEnabled {
        /// Always true.
        enabled: bool,
    },
    /// A player left; the game may no longer start.
    EligibilityDisabled {
        /// Always false.
        enabled: bool,
    },
    /// The game started.
    GameStarted {
        /// Player who moves first.
        turn: Player,
    },
    /// The grid was cleared.
    GameReset {
        /// Player who moves first.
        turn: Player,
    },
    /// A disc was dropped.
    GamePlayed(Placement),
    /// The last drop won the game.
    GameWin {
        /// The winner.
        identity: Player,
    },
    /// The grid filled up without a winner.
    GameDraw {},
    /// The game is over.
    GameEnded(Ended),
}

/// Outbound frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Reply to one command, sent to its caller only.
    Response {
        /// Correlation id from the envelope.
        id: Option<Value>,
        /// Whether the command succeeded.
        ok: bool,
        /// Success data.
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<ReplyData>,
        /// Failure description.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<ErrorBody>,
    },
    /// Broadcast event.
    Event {
        /// The event, flattened as `event` and `data`.
        #[serde(flatten)]
        event: GameEvent,
    },
}

impl ServerMessage {
    /// Builds the reply for a command outcome.
    pub fn reply(id: Option<Value>, outcome: &Result<ReplyData, CommandError>) -> Self {
        match outcome {
            Ok(data) => ServerMessage::Response {
                id,
                ok: true,
                data: Some(data.clone()),
                error: None,
            },
            Err(error) => ServerMessage::Response {
                id,
                ok: false,
                data: None,
                error: Some(ErrorBody::from(error)),
            },
        }
    }
}

impl From<GameEvent> for ServerMessage {
    fn from(event: GameEvent) -> Self {
        ServerMessage::Event { event }
    }
}
