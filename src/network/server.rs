//! WebSocket Game Server
//!
//! Async WebSocket server exposing the game engine.
//! Each connection is served by its own task; engine calls are short
//! in-memory operations and run inline.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch, RwLock};
use tokio::time::{sleep, Instant};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, instrument, warn};

use crate::dictionary::WordSource;
use crate::game::{GameConfig, GameEngine};
use crate::network::protocol::{ClientMessage, ErrorCode, ServerError, ServerMessage};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Close connections silent for this long.
    pub idle_timeout: Duration,
    /// Word list loaded at startup.
    pub dictionary: WordSource,
    /// Game rules.
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_connections: 1000,
            idle_timeout: Duration::from_secs(300),
            dictionary: WordSource::Embedded,
            game: GameConfig::default(),
        }
    }
}

/// Parse `key`, warning and ignoring values that do not parse.
fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

impl ServerConfig {
    /// Load from `WORDLE_*` environment variables over the defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup over the defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = parse_var(&lookup, "WORDLE_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(max) = parse_var(&lookup, "WORDLE_MAX_CONNECTIONS") {
            config.max_connections = max;
        }
        if let Some(secs) = parse_var(&lookup, "WORDLE_IDLE_TIMEOUT_SECS") {
            config.idle_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = lookup("WORDLE_DICTIONARY").filter(|p| !p.trim().is_empty()) {
            config.dictionary = WordSource::File(PathBuf::from(path.trim()));
        }
        if let Some(max) = parse_var(&lookup, "WORDLE_MAX_ATTEMPTS") {
            config.game.max_attempts = max;
        }
        if let Some(max) = parse_var(&lookup, "WORDLE_MAX_VALID_ATTEMPTS") {
            config.game.max_valid_attempts = max;
        }

        config
    }
}

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),
}

/// Resolve once shutdown has been requested, including before this call.
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            // Server dropped without a shutdown; never resolve
            std::future::pending::<()>().await;
        }
    }
}

/// Connected client state.
struct ConnectedClient {
    connected_at: Instant,
    messages: u64,
}

/// The game server.
pub struct GameServer {
    /// Server configuration.
    config: ServerConfig,
    /// Game engine shared by all connections.
    engine: Arc<GameEngine>,
    /// Connected clients.
    clients: Arc<RwLock<BTreeMap<SocketAddr, ConnectedClient>>>,
    /// Shutdown flag. Late subscribers still see it once set.
    shutdown_tx: watch::Sender<bool>,
}

impl GameServer {
    /// Create a new game server.
    pub fn new(config: ServerConfig, engine: Arc<GameEngine>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            engine,
            clients: Arc::new(RwLock::new(BTreeMap::new())),
            shutdown_tx,
        }
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn run(&self) -> Result<(), GameServerError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener until shutdown.
    #[instrument(skip_all)]
    pub async fn serve(&self, listener: TcpListener) -> Result<(), GameServerError> {
        info!("Game server listening on {}", listener.local_addr()?);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            // Reserve the slot before the handshake
                            {
                                let mut clients = self.clients.write().await;
                                if clients.len() >= self.config.max_connections {
                                    warn!("Connection limit reached, rejecting {}", addr);
                                    continue;
                                }
                                clients.insert(addr, ConnectedClient {
                                    connected_at: Instant::now(),
                                    messages: 0,
                                });
                            }

                            info!("New connection from {}", addr);
                            self.handle_connection(stream, addr);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_requested(&mut shutdown_rx) => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle a new WebSocket connection.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let clients = self.clients.clone();
        let engine = self.engine.clone();
        let idle_timeout = self.config.idle_timeout;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    error!("WebSocket handshake failed for {}: {}", addr, e);
                    clients.write().await.remove(&addr);
                    return;
                }
            };

            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(64);

            // Drains queued messages, then closes the socket once the
            // receive loop drops its sender
            let sender_task = tokio::spawn(async move {
                while let Some(msg) = msg_rx.recv().await {
                    let text = match msg.to_json() {
                        Ok(t) => t,
                        Err(e) => {
                            error!("Failed to serialize message: {}", e);
                            continue;
                        }
                    };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        return;
                    }
                }
                let _ = ws_sender.close().await;
            });

            let idle = sleep(idle_timeout);
            tokio::pin!(idle);

            loop {
                tokio::select! {
                    msg = ws_receiver.next() => {
                        idle.as_mut().reset(Instant::now() + idle_timeout);

                        let reply = match msg {
                            Some(Ok(Message::Text(text))) => {
                                if let Some(client) = clients.write().await.get_mut(&addr) {
                                    client.messages += 1;
                                }

                                match ClientMessage::from_json(&text) {
                                    Ok(client_msg) => handle_client_message(&engine, client_msg),
                                    Err(e) => {
                                        debug!("Invalid message from {}: {}", addr, e);
                                        ServerMessage::Error(ServerError::new(
                                            ErrorCode::InvalidInput,
                                            "Invalid message format",
                                        ))
                                    }
                                }
                            }
                            Some(Ok(Message::Binary(_))) => ServerMessage::Error(ServerError::new(
                                ErrorCode::InvalidInput,
                                "Binary messages are not supported",
                            )),
                            Some(Ok(Message::Close(_))) | None => {
                                debug!("Client {} disconnected", addr);
                                break;
                            }
                            Some(Err(e)) => {
                                error!("WebSocket error for {}: {}", addr, e);
                                break;
                            }
                            Some(Ok(_)) => continue,
                        };

                        if msg_tx.send(reply).await.is_err() {
                            break;
                        }
                    }
                    _ = &mut idle => {
                        info!("Closing idle connection {}", addr);
                        break;
                    }
                    _ = shutdown_requested(&mut shutdown_rx) => {
                        let _ = msg_tx.send(ServerMessage::Shutdown {
                            reason: "Server shutting down".to_string(),
                        }).await;
                        break;
                    }
                }
            }

            // Cleanup
            drop(msg_tx);
            let _ = sender_task.await;

            if let Some(client) = clients.write().await.remove(&addr) {
                info!(
                    "Client {} cleaned up after {:?}, {} messages",
                    addr,
                    client.connected_at.elapsed(),
                    client.messages
                );
            }
        });
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Get active connection count.
    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Apply one client request to the engine and build the reply.
fn handle_client_message(engine: &GameEngine, msg: ClientMessage) -> ServerMessage {
    let result = match msg {
        ClientMessage::NewGame { word } => engine
            .create(word.as_deref())
            .map(|game| ServerMessage::from(game.describe())),
        ClientMessage::Describe { id } => engine.describe(&id).map(ServerMessage::from),
        ClientMessage::Guess { id, word } => engine.play_by_id(&id, &word).map(ServerMessage::from),
        ClientMessage::Resign { id } => engine.resign_by_id(&id).map(ServerMessage::from),
        ClientMessage::Ping { timestamp } => Ok(ServerMessage::Pong {
            timestamp,
            server_time: u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default(),
        }),
    };

    result.unwrap_or_else(|e| {
        let server_error = ServerError::from(&e);
        if server_error.code.is_client_error() {
            debug!("Request failed: {}", e);
        } else {
            error!("Request failed: {}", e);
        }
        ServerMessage::Error(server_error)
    })
}
