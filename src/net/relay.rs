//! Shot relay: every `shoot` from a peer is broadcast to all connected peers
//! (sender included), and the latest one is buffered and replayed to peers
//! that join later.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::protocol::{decode_client, ClientMsg, ServerMsg, PROTOCOL_VERSION};

/// Relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub listen_addr: String,
    pub broadcast_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9002".to_string(),
            broadcast_capacity: 64,
        }
    }
}

impl RelayConfig {
    /// Defaults overridden by `SHADOW_SHOT_RELAY_ADDR` / `SHADOW_SHOT_RELAY_CAPACITY`.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(addr) = std::env::var("SHADOW_SHOT_RELAY_ADDR") {
            cfg.listen_addr = addr;
        }
        if let Ok(cap) = std::env::var("SHADOW_SHOT_RELAY_CAPACITY") {
            match cap.parse::<usize>() {
                Ok(n) if n > 0 => cfg.broadcast_capacity = n,
                _ => tracing::warn!("ignoring invalid SHADOW_SHOT_RELAY_CAPACITY={}", cap),
            }
        }
        cfg
    }
}

/// A published shot with its position in the relay's publish order.
type Sequenced = (u64, ServerMsg);

/// Shared state passed to each WebSocket handler
#[derive(Clone)]
pub struct RelayState {
    broadcast_tx: broadcast::Sender<Sequenced>,
    latest: Arc<RwLock<Option<Sequenced>>>,
    peers: Arc<AtomicUsize>,
}

impl RelayState {
    pub fn new(capacity: usize) -> Self {
        let (broadcast_tx, _) = broadcast::channel(capacity.max(1));
        Self {
            broadcast_tx,
            latest: Arc::new(RwLock::new(None)),
            peers: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn peer_count(&self) -> usize {
        self.peers.load(Ordering::Relaxed)
    }

    pub async fn latest_shot(&self) -> Option<ServerMsg> {
        self.latest.read().await.as_ref().map(|(_, msg)| msg.clone())
    }

    /// Buffers and broadcasts a shot from `from`.
    async fn publish(&self, from: Uuid, force: [f32; 3]) {
        let msg = ServerMsg::Shoot { from, force, buffered: false };
        // Sequence and send under the write lock so buffer and channel agree on order.
        let mut latest = self.latest.write().await;
        let seq = latest.as_ref().map_or(1, |(seq, _)| seq + 1);
        *latest = Some((seq, msg.clone()));
        // No receivers is fine: the shot stays buffered for the next joiner.
        let _ = self.broadcast_tx.send((seq, msg));
    }

    /// Subscribes a joining peer and returns the buffered shot to replay.
    /// Broadcasts up to the returned sequence number are already covered by
    /// the replay.
    async fn join(&self) -> (broadcast::Receiver<Sequenced>, Option<Sequenced>) {
        let rx = self.broadcast_tx.subscribe();
        let replay = self.latest.read().await.clone();
        (rx, replay)
    }
}

pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: RelayState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

async fn health(State(state): State<RelayState>) -> String {
    format!("ok peers={}", state.peer_count())
}

/// HTTP handler for WebSocket upgrade
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<RelayState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn send_json(sink: &mut futures_util::stream::SplitSink<WebSocket, Message>, msg: &ServerMsg) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sink.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("failed to encode {:?}: {}", msg, e);
            true
        }
    }
}

async fn handle_socket(socket: WebSocket, state: RelayState) {
    let (mut sink, mut stream) = socket.split();
    let peer_id = Uuid::new_v4();

    // Subscribe before replaying the buffer so nothing published in between is lost.
    let (mut broadcast_rx, replay) = state.join().await;
    let peers = state.peers.fetch_add(1, Ordering::Relaxed) + 1;
    tracing::info!("peer {} connected (peers={})", peer_id, peers);

    let welcome = ServerMsg::Welcome { protocol_version: PROTOCOL_VERSION, peer_id };
    if send_json(&mut sink, &welcome).await {
        let replayed_seq = replay.as_ref().map(|(seq, _)| *seq);
        let replayed = match replay {
            Some((_, msg)) => send_json(&mut sink, &as_buffered(msg)).await,
            None => true,
        };
        if replayed {
            relay_loop(peer_id, &state, &mut sink, &mut stream, &mut broadcast_rx, replayed_seq).await;
        }
    }

    let peers = state.peers.fetch_sub(1, Ordering::Relaxed) - 1;
    tracing::info!("peer {} disconnected (peers={})", peer_id, peers);
}

fn as_buffered(msg: ServerMsg) -> ServerMsg {
    match msg {
        ServerMsg::Shoot { from, force, .. } => ServerMsg::Shoot { from, force, buffered: true },
        other => other,
    }
}

/// True for a broadcast the joining peer already got from the buffer.
fn already_replayed(seq: u64, replayed_seq: Option<u64>) -> bool {
    replayed_seq.is_some_and(|r| seq <= r)
}

async fn relay_loop(
    peer_id: Uuid,
    state: &RelayState,
    sink: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    stream: &mut futures_util::stream::SplitStream<WebSocket>,
    broadcast_rx: &mut broadcast::Receiver<Sequenced>,
    replayed_seq: Option<u64>,
) {
    loop {
        tokio::select! {
            // Peer -> relay
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match decode_client(text.as_str()) {
                        Ok(ClientMsg::Shoot { force }) => {
                            tracing::debug!("peer {} shoot force={:?}", peer_id, force);
                            state.publish(peer_id, force).await;
                        }
                        Err(e) => tracing::warn!("peer {} sent invalid message: {}", peer_id, e),
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!("peer {} socket error: {}", peer_id, e);
                        break;
                    }
                    _ => {} // Ignore ping/pong/binary
                }
            }

            // Relay -> peer (broadcast, sender included)
            result = broadcast_rx.recv() => {
                match result {
                    Ok((seq, _)) if already_replayed(seq, replayed_seq) => {
                        tracing::debug!("peer {} skipping replayed shot seq={}", peer_id, seq);
                    }
                    Ok((_, msg)) => {
                        if !send_json(sink, &msg).await {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("peer {} lagged by {} shots", peer_id, n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}
