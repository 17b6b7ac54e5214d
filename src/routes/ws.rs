//! WebSocket handler: JSON event relay for senders and displays.
//!
//! DESIGN
//! ======
//! On upgrade, registers a connection with the hub and enters a `select!`
//! loop:
//! - Incoming text frames → decode as `ClientEvent` → forward to the hub
//! - Events queued by the hub → encode → send to the socket
//!
//! Senders and displays share this endpoint and are treated identically.
//! Frames that do not decode are dropped without a reply; the hub has no
//! error channel back to senders.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → hub registers the connection and queues the moderation list
//! 2. Inbound frames → hub → broadcast to every connection
//! 3. Hub releases the connection (listener move) → close frame → exit
//! 4. Socket close → hub forgets the connection

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use protocol::ServerEvent;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::AppState;

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();

    // Per-connection queue for events fanned out by the hub.
    let (client_tx, mut client_rx) = mpsc::channel::<ServerEvent>(state.client_queue_capacity);

    if let Err(e) = state.hub.connect(client_id, client_tx).await {
        warn!(%client_id, error = %e, "ws: hub unavailable, refusing connection");
        return;
    }
    info!(%client_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => dispatch_text(&state, client_id, text.as_str()).await,
                    Message::Binary(_) => debug!(%client_id, "ws: binary frame dropped"),
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            event = client_rx.recv() => {
                let Some(event) = event else {
                    // The hub dropped our queue: the listener is moving.
                    if socket.send(Message::Close(None)).await.is_err() {
                        debug!(%client_id, "ws: close frame not delivered");
                    }
                    break;
                };
                if send_event(&mut socket, client_id, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    if state.hub.disconnect(client_id).await.is_err() {
        debug!(%client_id, "ws: hub already stopped");
    }
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Decode one inbound text frame and hand it to the hub.
async fn dispatch_text(state: &AppState, client_id: Uuid, text: &str) {
    let event = match protocol::decode_client_event(text) {
        Ok(event) => event,
        Err(e) => {
            debug!(%client_id, error = %e, "ws: undecodable frame dropped");
            return;
        }
    };
    debug!(%client_id, event = event.name(), "ws: recv event");
    if let Err(e) = state.hub.inbound(client_id, event).await {
        warn!(%client_id, error = %e, "ws: hub unavailable, event lost");
    }
}

async fn send_event(socket: &mut WebSocket, client_id: Uuid, event: &ServerEvent) -> Result<(), ()> {
    let text = match protocol::encode_server_event(event) {
        Ok(text) => text,
        Err(e) => {
            warn!(%client_id, event = event.name(), error = %e, "ws: event not encodable, skipped");
            return Ok(());
        }
    };
    socket.send(Message::Text(text.into())).await.map_err(|e| {
        debug!(%client_id, error = %e, "ws: send failed");
    })
}
