//! WebSocket server wiring a [`GameRoom`] to connected clients.

use crate::config::ServerConfig;
use crate::protocol::{ConnectionId, ServerMessage};
use crate::room::{Audience, Broadcast, GameRoom};
use axum::body::Body;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::Request;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use strictly_connect_four::Player;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tracing::{debug, error, info, instrument, warn};

/// How long a closing connection may take to flush its queued frames.
const WRITER_DRAIN: Duration = Duration::from_secs(2);

/// The room plus the outbound queue of every open connection.
///
/// Held behind one lock: a command is validated, applied, answered and
/// broadcast before the next one is looked at.
#[derive(Debug, Default)]
pub struct Hub {
    room: GameRoom,
    peers: HashMap<ConnectionId, mpsc::Sender<String>>,
}

impl Hub {
    /// Creates a hub around an empty room.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the room.
    pub fn room(&self) -> &GameRoom {
        &self.room
    }

    /// Registers the outbound queue of a new connection.
    #[instrument(skip(self, tx))]
    pub fn join(&mut self, connection: ConnectionId, tx: mpsc::Sender<String>) {
        self.peers.insert(connection, tx);
        info!(peers = self.peers.len(), "Connection opened");
    }

    /// Handles one inbound text frame from `connection`.
    #[instrument(skip(self, text))]
    pub fn dispatch(&mut self, connection: ConnectionId, text: &str) {
        let dispatch = self.room.handle_frame(connection, text);
        self.send_to(connection, &dispatch.reply);
        self.fan_out(connection, &dispatch.broadcasts);
    }

    /// Drops a closed connection and unregisters its player, if any.
    #[instrument(skip(self))]
    pub fn leave(&mut self, connection: ConnectionId) {
        self.peers.remove(&connection);
        let broadcasts = self.room.connection_closed(connection);
        self.fan_out(connection, &broadcasts);
        info!(peers = self.peers.len(), "Connection closed");
    }

    fn fan_out(&self, caller: ConnectionId, broadcasts: &[Broadcast]) {
        for broadcast in broadcasts {
            let message = ServerMessage::from(broadcast.event.clone());
            let Some(frame) = encode(&message) else {
                continue;
            };
            for (&peer, tx) in &self.peers {
                if broadcast.audience == Audience::Others && peer == caller {
                    continue;
                }
                deliver(peer, tx, frame.clone());
            }
        }
    }

    fn send_to(&self, connection: ConnectionId, message: &ServerMessage) {
        let Some(tx) = self.peers.get(&connection) else {
            debug!(%connection, "Reply for a connection that already left");
            return;
        };
        if let Some(frame) = encode(message) {
            deliver(connection, tx, frame);
        }
    }
}

fn encode(message: &ServerMessage) -> Option<String> {
    serde_json::to_string(message)
        .map_err(|e| error!(error = %e, "Failed to encode outbound frame"))
        .ok()
}

fn deliver(connection: ConnectionId, tx: &mpsc::Sender<String>, frame: String) {
    match tx.try_send(frame) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(frame)) => {
            warn!(%connection, frame_len = frame.len(), "Send queue full, dropping frame");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!(%connection, "Send queue closed");
        }
    }
}

/// Shared state handed to axum handlers.
#[derive(Clone)]
pub struct AppState {
    hub: Arc<Mutex<Hub>>,
    max_send_queue: usize,
}

impl AppState {
    /// Creates state for a fresh room.
    pub fn new(max_send_queue: usize) -> Self {
        Self {
            hub: Arc::new(Mutex::new(Hub::new())),
            max_send_queue,
        }
    }
}

/// Builds the router: `/ws` for the game channel, `/health` for probes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
}

/// Handle returned by [`start`]; keeps the server task alive.
pub struct ServerHandle {
    /// Address the listener is bound to.
    pub addr: SocketAddr,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    /// Waits for the server to stop.
    pub async fn wait(self) -> anyhow::Result<()> {
        self.task.await??;
        Ok(())
    }

    /// Stops the server.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

/// Binds the listener and starts serving in the background.
#[instrument(skip(config), fields(address = %config.bind_address()))]
pub async fn start(config: &ServerConfig) -> std::io::Result<ServerHandle> {
    let state = AppState::new(*config.max_send_queue());
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "Connect Four server listening, WebSocket at /ws");

    let task = tokio::spawn(async move { axum::serve(listener, router).await });
    Ok(ServerHandle { addr, task })
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

#[instrument(skip_all, fields(connection = tracing::field::Empty))]
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection = ConnectionId::new();
    tracing::Span::current().record("connection", tracing::field::display(connection));

    let (tx, mut rx) = mpsc::channel::<String>(state.max_send_queue);
    state.hub.lock().await.join(connection, tx);

    let (mut sink, mut stream) = socket.split();
    let mut writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => state.hub.lock().await.dispatch(connection, text.as_str()),
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "WebSocket read failed");
                break;
            }
        }
    }

    // Leaving drops the hub's sender, so the writer stops once the queue is empty.
    state.hub.lock().await.leave(connection);
    if tokio::time::timeout(WRITER_DRAIN, &mut writer).await.is_err() {
        debug!("Writer did not drain in time");
        writer.abort();
    }
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    connected: Vec<Player>,
    started: bool,
    enabled: bool,
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let hub = state.hub.lock().await;
    let room = hub.room();
    Json(HealthReport {
        status: "ok",
        connected: room.registry().find_all(),
        started: room.session().is_started(),
        enabled: room.session().is_enabled(),
    })
}
