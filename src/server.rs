use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::engine::GameEngine;
use crate::error::ServerError;
use crate::protocol::{parse_client_message, ClientIntent};
use crate::registry::{ConnectionRegistry, OutboundMessage};
use crate::rng::GameRng;
use crate::types::{JoinedPlayer, TickReport};

pub type SharedState = Arc<Mutex<ServerState>>;

/// World and connections behind one lock, so a player and its connection
/// are always added and removed together.
pub struct ServerState {
    pub engine: GameEngine,
    pub registry: ConnectionRegistry,
}

impl ServerState {
    pub fn new(engine: GameEngine) -> Self {
        Self {
            engine,
            registry: ConnectionRegistry::new(),
        }
    }

    pub fn shared(engine: GameEngine) -> SharedState {
        Arc::new(Mutex::new(Self::new(engine)))
    }

    pub fn connect(&mut self, tx: mpsc::Sender<OutboundMessage>) -> JoinedPlayer {
        let joined = self.engine.join();
        self.registry.register(&joined.id, tx);
        joined
    }

    /// Returns false when the player was already gone.
    pub fn disconnect(&mut self, player_id: &str) -> bool {
        let left = self.engine.leave(player_id).is_some();
        let unregistered = self.registry.unregister(player_id);
        left || unregistered
    }

    pub fn apply_intent(&mut self, player_id: &str, intent: ClientIntent) -> bool {
        match intent {
            ClientIntent::Move { x, y } => self.engine.apply_move(player_id, x, y),
        }
    }

    /// Advances the world one tick and queues the resulting snapshot for
    /// every connection.
    pub fn tick(&mut self) -> TickReport {
        let report = self.engine.step();
        match serde_json::to_string(&self.engine.build_snapshot()) {
            Ok(payload) => {
                let missed = self.registry.broadcast(&payload);
                if !missed.is_empty() {
                    debug!(?missed, "snapshot dropped for busy connections");
                }
            }
            Err(err) => warn!(%err, "failed to encode snapshot"),
        }
        report
    }
}

#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub bind: String,
    pub port: u16,
    pub seed: Option<u64>,
    pub static_dir: Option<PathBuf>,
    pub game: GameConfig,
}

pub async fn run(options: ServerOptions) -> Result<(), ServerError> {
    options.game.validate()?;

    let rng = options
        .seed
        .map(GameRng::new)
        .unwrap_or_else(GameRng::from_entropy);
    let engine = GameEngine::with_rng(options.game.clone(), rng);
    info!(
        seed = engine.seed(),
        tick_ms = options.game.tick_ms,
        round_seconds = options.game.round_seconds,
        "game engine ready"
    );

    let state = ServerState::shared(engine);
    let ticker = start_tick_loop(state.clone(), options.game.tick_interval());
    let app = router(state.clone(), options.static_dir.clone());

    let bind_addr = format!("{}:{}", options.bind, options.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: bind_addr.clone(),
            source,
        })?;
    info!("listening on ws://{bind_addr}/ws");

    let shutdown_state = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("shutting down");
            shutdown_state
                .lock()
                .await
                .registry
                .close_all(1001, "server shutting down");
        })
        .await
        .map_err(ServerError::Serve)?;

    ticker.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

pub fn router(state: SharedState, static_dir: Option<PathBuf>) -> Router {
    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .with_state(state);

    match static_dir {
        Some(dir) if dir.join("index.html").is_file() => {
            info!(root = %dir.display(), "serving static files");
            let index_file = dir.join("index.html");
            app.fallback_service(ServeDir::new(dir).not_found_service(ServeFile::new(index_file)))
        }
        Some(dir) => {
            warn!(root = %dir.display(), "static root has no index.html, not serving it");
            app
        }
        None => app,
    }
}

pub fn start_tick_loop(state: SharedState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            guard.tick();
        }
    })
}

async fn healthz(State(state): State<SharedState>) -> impl IntoResponse {
    let players = state.lock().await.engine.player_count();
    Json(json!({ "ok": true, "players": players }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (player_id, mut rx) = {
        let mut guard = state.lock().await;
        let (tx, rx) = mpsc::channel::<OutboundMessage>(guard.engine.config.outbound_queue);
        (guard.connect(tx).id, rx)
    };

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let should_close = matches!(outbound, OutboundMessage::Close { .. });
            let result = match outbound {
                OutboundMessage::Text(payload) => {
                    ws_sender.send(Message::Text(payload.into())).await
                }
                OutboundMessage::Close { code, reason } => {
                    let frame = CloseFrame {
                        code,
                        reason: reason.into(),
                    };
                    ws_sender.send(Message::Close(Some(frame))).await
                }
            };
            if result.is_err() || should_close {
                break;
            }
        }
    });

    while let Some(received) = ws_receiver.next().await {
        let message = match received {
            Ok(message) => message,
            Err(err) => {
                warn!(player_id = %player_id, %err, "websocket read failed");
                break;
            }
        };

        match message {
            Message::Text(raw) => {
                handle_client_message(&state, &player_id, raw.as_str()).await;
            }
            Message::Binary(raw) => match std::str::from_utf8(&raw) {
                Ok(text) => handle_client_message(&state, &player_id, text).await,
                Err(_) => debug!(player_id = %player_id, "ignoring non-utf8 frame"),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.lock().await.disconnect(&player_id);
    let _ = writer.await;
}

pub async fn handle_client_message(state: &SharedState, player_id: &str, raw: &str) {
    let Some(intent) = parse_client_message(raw) else {
        debug!(player_id, raw, "ignoring unrecognized message");
        return;
    };
    state.lock().await.apply_intent(player_id, intent);
}
