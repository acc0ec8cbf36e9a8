//! WebSocket endpoint for the persistent real-time channel.
//!
//! Clients join rooms and receive fan-out events for them:
//! - `join_room` subscribes to one ticket's room (thread updates)
//! - `join_global` subscribes to the dashboard-wide topic
//! - `send_message` appends to a thread; the resulting event arrives
//!   through the room subscription like everyone else's, so the sender
//!   sees its own message exactly once
//!
//! # Architecture
//!
//! ```text
//! Client            WebSocket Handler           Store        RoomBus
//!   │                      │                      │             │
//!   ├─ join_room ─────────>│                      │             │
//!   │                      ├─ may_join? ─ subscribe ───────────>│
//!   │<─ joined ────────────┤                      │             │
//!   │                      │                      │             │
//!   ├─ send_message ──────>│                      │             │
//!   │                      ├─ append_message ────>├─ publish ──>│
//!   │                      │<────────── event ─────────────────┤
//!   │<─ message_appended ──┤                      │             │
//! ```
//!
//! # Connection Limits
//!
//! - Max 1000 concurrent WebSocket connections per server instance
//! - Idle timeout: 5 minutes
//! - Ping keep-alive every 30 seconds

use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{stream::SplitSink, stream::StreamExt, SinkExt};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use supportdesk_core::types::{TicketId, UserId};
use supportdesk_realtime::{ClientMessage, Room, ServerMessage};
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Global WebSocket connection counter.
///
/// Tracks active connections to enforce system-wide limits.
static ACTIVE_CONNECTIONS: AtomicUsize = AtomicUsize::new(0);

/// Maximum concurrent WebSocket connections.
const MAX_CONNECTIONS: usize = 1000;

/// Ping interval for keep-alive (30 seconds).
const PING_INTERVAL_SECS: u64 = 30;

/// Idle timeout (5 minutes).
const IDLE_TIMEOUT_SECS: u64 = 300;

/// Poll interval for draining room subscriptions when idle.
const DRAIN_IDLE_MILLIS: u64 = 100;

type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// Connection query parameters.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Identity of the connecting user; required to join rooms
    pub user: Option<Uuid>,
}

/// WebSocket endpoint at `GET /ws?user=<uuid>`.
///
/// Returns 503 Service Unavailable once the connection limit is
/// reached. The `user` parameter is the identity handed to the
/// session gateway on each room join; connections without one can
/// still be established but every join is refused.
#[allow(clippy::unused_async)] // Axum handler signature requires async
pub async fn handle(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let current = ACTIVE_CONNECTIONS.load(Ordering::Relaxed);
    if current >= MAX_CONNECTIONS {
        warn!(
            current_connections = current,
            "WebSocket connection limit exceeded"
        );
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "Too many concurrent connections. Please try again later.",
        )
            .into_response();
    }

    let user = params.user.map(UserId::from_uuid);
    info!(user = ?user, "WebSocket connection requested");

    ws.on_upgrade(move |socket| handle_socket(socket, user, state))
}

/// Handle WebSocket connection lifecycle.
///
/// Spawns three concurrent tasks:
/// 1. **Receiver**: parse client messages, handle joins and sends
/// 2. **Sender**: drain joined-room subscriptions into the socket
/// 3. **Ping**: JSON keep-alive every 30 seconds
#[allow(clippy::cognitive_complexity)] // WebSocket event loops are naturally complex
async fn handle_socket(socket: WebSocket, user: Option<UserId>, state: AppState) {
    let count = ACTIVE_CONNECTIONS.fetch_add(1, Ordering::Relaxed) + 1;
    info!(
        user = ?user,
        total_connections = count,
        "WebSocket connection established"
    );

    // Split socket into sender and receiver
    let (sender, mut receiver) = socket.split();
    let sender: WsSender = Arc::new(Mutex::new(sender));

    // Rooms this connection has joined; the receive task adds to it,
    // the send task subscribes to new entries.
    let joined_rooms: Arc<RwLock<HashSet<Room>>> = Arc::new(RwLock::new(HashSet::new()));

    // Spawn receiver task to handle joins and message sends
    let recv_sender = Arc::clone(&sender);
    let recv_rooms = Arc::clone(&joined_rooms);
    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        let timeout = tokio::time::sleep(Duration::from_secs(IDLE_TIMEOUT_SECS));
        tokio::pin!(timeout);

        loop {
            tokio::select! {
                msg = receiver.next() => {
                    let Some(Ok(msg)) = msg else { break };
                    // Any inbound frame proves the client is alive
                    timeout.as_mut().reset(
                        tokio::time::Instant::now() + Duration::from_secs(IDLE_TIMEOUT_SECS),
                    );
                    match msg {
                        Message::Text(text) => {
                            handle_client_message(
                                &text,
                                user,
                                &recv_state,
                                &recv_rooms,
                                &recv_sender,
                            )
                            .await;
                        }
                        Message::Pong(_) => {
                            debug!("Received pong from client");
                        }
                        Message::Ping(_) => {
                            debug!("Received ping");
                            // Axum answers with a pong automatically
                        }
                        Message::Close(_) => {
                            info!("Client requested close");
                            break;
                        }
                        Message::Binary(_) => {
                            warn!("Received unexpected binary message");
                        }
                    }
                }
                () = &mut timeout => {
                    warn!("WebSocket idle timeout");
                    break;
                }
            }
        }

        debug!("WebSocket receive task terminated");
    });

    // Spawn sender task to drain events from joined rooms
    let send_sender = Arc::clone(&sender);
    let send_rooms = Arc::clone(&joined_rooms);
    let send_bus = state.bus.clone();
    let mut send_task = tokio::spawn(async move {
        let mut receivers: HashMap<Room, broadcast::Receiver<supportdesk_core::TicketEvent>> =
            HashMap::new();

        loop {
            let rooms: Vec<Room> = {
                let joined = send_rooms.read().await;
                joined.iter().copied().collect()
            };

            // Subscribe to any newly joined room
            for room in &rooms {
                if !receivers.contains_key(room) {
                    receivers.insert(*room, send_bus.subscribe(*room).await);
                    debug!(room = %room, "Subscribed to room");
                }
            }

            let mut received_event = false;
            for (room, rx) in &mut receivers {
                match rx.try_recv() {
                    Ok(event) => {
                        let message = ServerMessage::from(event);
                        if !send_json(&send_sender, &message).await {
                            // Client disconnected
                            return;
                        }
                        received_event = true;
                    },
                    Err(broadcast::error::TryRecvError::Empty) => {},
                    Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                        // Resync will catch the client up; nothing to replay
                        warn!(room = %room, skipped, "Client lagging, skipped events");
                    },
                    Err(broadcast::error::TryRecvError::Closed) => {
                        debug!(room = %room, "Room channel closed");
                    },
                }
            }

            // If no events received, wait a bit before polling again
            if !received_event {
                tokio::time::sleep(Duration::from_millis(DRAIN_IDLE_MILLIS)).await;
            }
        }
    });

    // Spawn ping task for keep-alive
    let ping_sender = Arc::clone(&sender);
    let mut ping_interval = interval(Duration::from_secs(PING_INTERVAL_SECS));
    let mut ping_task = tokio::spawn(async move {
        loop {
            ping_interval.tick().await;
            if !send_json(&ping_sender, &ServerMessage::Ping).await {
                break;
            }
        }
        debug!("WebSocket ping task terminated");
    });

    // Wait for any task to complete
    tokio::select! {
        _ = (&mut recv_task) => {
            debug!("Receive task completed, aborting other tasks");
            send_task.abort();
            ping_task.abort();
        },
        _ = (&mut send_task) => {
            debug!("Send task completed, aborting other tasks");
            recv_task.abort();
            ping_task.abort();
        },
        _ = (&mut ping_task) => {
            debug!("Ping task completed, aborting other tasks");
            recv_task.abort();
            send_task.abort();
        },
    }

    // Drop empty room channels left behind by this connection
    state.bus.prune().await;

    let count = ACTIVE_CONNECTIONS.fetch_sub(1, Ordering::Relaxed) - 1;
    info!(
        user = ?user,
        total_connections = count,
        "WebSocket connection closed"
    );
}

/// Process one text frame from the client.
async fn handle_client_message(
    text: &str,
    user: Option<UserId>,
    state: &AppState,
    rooms: &Arc<RwLock<HashSet<Room>>>,
    sender: &WsSender,
) {
    let parsed = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            debug!(error = %e, "Failed to parse WebSocket message");
            send_error(sender, format!("unrecognized message: {e}")).await;
            return;
        },
    };

    match parsed {
        ClientMessage::JoinRoom { ticket_id } => {
            join(user, Room::Ticket(ticket_id), Some(ticket_id), state, rooms, sender).await;
        },
        ClientMessage::JoinGlobal => {
            join(user, Room::Global, None, state, rooms, sender).await;
        },
        ClientMessage::SendMessage {
            ticket_id,
            body,
            attachment,
            sender: role,
        } => {
            // Commit through the store; the fan-out it triggers is the
            // only path back to this connection (and everyone else's).
            if let Err(e) = state
                .store
                .append_message(ticket_id, role, body, attachment)
                .await
            {
                debug!(ticket_id = %ticket_id, error = %e, "Message rejected");
                send_error(sender, e.to_string()).await;
            }
        },
        ClientMessage::Pong => {
            debug!("Received pong from client");
        },
    }
}

/// Authorize and register a room join, confirming or refusing it.
async fn join(
    user: Option<UserId>,
    room: Room,
    ticket: Option<TicketId>,
    state: &AppState,
    rooms: &Arc<RwLock<HashSet<Room>>>,
    sender: &WsSender,
) {
    let Some(user) = user else {
        send_error(sender, "joining rooms requires a user identity".to_string()).await;
        return;
    };

    if let Some(ticket_id) = ticket {
        if !state.store.exists(ticket_id).await {
            send_error(sender, format!("ticket {ticket_id} not found")).await;
            return;
        }
    }

    if !state.gateway.may_join(user, &room).await {
        info!(user = %user, room = %room, "Room join refused");
        send_error(sender, format!("not authorized to join {room}")).await;
        return;
    }

    rooms.write().await.insert(room);
    debug!(user = %user, room = %room, "Room joined");
    send_json(
        sender,
        &ServerMessage::Joined {
            room: room.to_string(),
        },
    )
    .await;
}

/// Serialize and send one server message; false means the client is gone.
async fn send_json(sender: &WsSender, message: &ServerMessage) -> bool {
    match serde_json::to_string(message) {
        Ok(json) => {
            let mut guard = sender.lock().await;
            guard.send(Message::Text(json)).await.is_ok()
        },
        Err(e) => {
            warn!(error = %e, "Failed to serialize server message");
            true
        },
    }
}

async fn send_error(sender: &WsSender, message: String) {
    let _sent = send_json(sender, &ServerMessage::Error { message }).await;
}

/// Get current WebSocket connection count.
///
/// Useful for monitoring and observability.
#[must_use]
pub fn active_connection_count() -> usize {
    ACTIVE_CONNECTIONS.load(Ordering::Relaxed)
}
