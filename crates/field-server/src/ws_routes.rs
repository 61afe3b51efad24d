use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use dashmap::DashMap;
use field_core::FieldSnapshot;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::AppState;

// ---------------------------------------------------------------------------
// Broadcast hub: latest snapshot per symbol + fan-out channel
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct FieldBroadcast {
    snapshots: broadcast::Sender<FieldSnapshot>,
    latest: Arc<DashMap<String, FieldSnapshot>>,
}

impl FieldBroadcast {
    pub fn new() -> Self {
        let (snapshots, _) = broadcast::channel(2048);
        Self {
            snapshots,
            latest: Arc::new(DashMap::new()),
        }
    }

    /// Update the cache and fan out. A send with no subscribers is fine.
    pub fn publish(&self, snapshot: FieldSnapshot) {
        self.latest
            .insert(snapshot.symbol.clone(), snapshot.clone());
        let _ = self.snapshots.send(snapshot);
    }

    pub fn latest_for(&self, symbol: &str) -> Option<FieldSnapshot> {
        self.latest.get(symbol).map(|entry| entry.value().clone())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FieldSnapshot> {
        self.snapshots.subscribe()
    }
}

impl Default for FieldBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// WebSocket handler: /ws/field/:symbol
// ---------------------------------------------------------------------------

async fn ws_field_handler(
    ws: WebSocketUpgrade,
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let symbol = symbol.to_uppercase();
    ws.on_upgrade(move |socket| handle_field_socket(socket, state, symbol))
}

async fn handle_field_socket(socket: WebSocket, state: AppState, symbol: String) {
    let (mut sender, mut receiver) = socket.split();

    // Send the current snapshot so the client starts warm
    if let Some(snapshot) = state.broadcast.latest_for(&symbol) {
        if let Ok(json) = serde_json::to_string(&snapshot) {
            if sender.send(Message::Text(json)).await.is_err() {
                return;
            }
        }
    }

    let mut rx = state.broadcast.subscribe();

    // Fan out this symbol's snapshots; a lagging or dead client drops out of
    // the loop and is forgotten without affecting other subscribers
    let send_task = tokio::spawn(async move {
        while let Ok(snapshot) = rx.recv().await {
            if snapshot.symbol != symbol {
                continue;
            }
            if let Ok(json) = serde_json::to_string(&snapshot) {
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        }
    });

    // Drain the client side until it closes
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }
}

pub fn ws_routes() -> Router<AppState> {
    Router::new().route("/ws/field/:symbol", get(ws_field_handler))
}
