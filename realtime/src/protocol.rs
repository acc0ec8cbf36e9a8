//! Wire protocol for the persistent real-time channel.
//!
//! # Message Protocol
//!
//! **Client → Server (join a ticket room):**
//! ```json
//! { "type": "join_room", "ticket_id": "550e8400-..." }
//! ```
//!
//! **Client → Server (send a message):**
//! ```json
//! { "type": "send_message", "ticket_id": "550e8400-...",
//!   "body": "Where is my refund?", "attachment": null }
//! ```
//!
//! **Server → Client (event):**
//! ```json
//! { "type": "status_changed",
//!   "ticket_id": "550e8400-...",
//!   "old_status": "open", "new_status": "resolved", "delta": -1 }
//! ```
//!
//! Server events are advisory: any single one may be lost, and clients
//! rely on periodic resync for correctness, not on individual-message
//! reliability.

use serde::{Deserialize, Serialize};
use supportdesk_core::event::TicketEvent;
use supportdesk_core::types::{SenderRole, Status, Ticket, TicketId, TicketMessage};

/// Message from a connected client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join the room of one ticket (authorization is delegated to the
    /// session gateway).
    JoinRoom {
        /// Ticket whose room to join
        ticket_id: TicketId,
    },
    /// Join the dashboard-wide topic (list and badge views).
    JoinGlobal,
    /// Append a message to a ticket's thread. The store commit - not
    /// this connection - triggers the resulting fan-out, so the sender
    /// receives its own `message_appended` echo exactly once.
    SendMessage {
        /// Target ticket
        ticket_id: TicketId,
        /// Message text (may be empty only with an attachment)
        body: String,
        /// Optional opaque attachment reference
        attachment: Option<String>,
        /// Who is sending (defaults to the requester side)
        #[serde(default = "default_sender")]
        sender: SenderRole,
    },
    /// Keep-alive response
    Pong,
}

const fn default_sender() -> SenderRole {
    SenderRole::Requester
}

/// Message from the server to a connected client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A ticket was created (global topic).
    TicketCreated {
        /// The new ticket
        ticket: Ticket,
    },
    /// A ticket's status changed. Carries the precomputed badge delta.
    StatusChanged {
        /// The ticket whose status changed
        ticket_id: TicketId,
        /// Status before the change
        old_status: Status,
        /// Status after the change
        new_status: Status,
        /// Open-count delta for the badge
        delta: i64,
    },
    /// A message was appended to a subscribed ticket's thread.
    MessageAppended {
        /// The ticket whose thread grew
        ticket_id: TicketId,
        /// The appended message
        message: TicketMessage,
    },
    /// Confirmation that a room was joined.
    Joined {
        /// Room name in wire form (`ticket:<id>` or `global`)
        room: String,
    },
    /// Error message (bad request on this connection; the connection
    /// stays open).
    Error {
        /// Error description
        message: String,
    },
    /// Keep-alive probe
    Ping,
}

impl From<TicketEvent> for ServerMessage {
    fn from(event: TicketEvent) -> Self {
        match event {
            TicketEvent::Created { ticket } => Self::TicketCreated { ticket },
            TicketEvent::StatusChanged { change } => Self::StatusChanged {
                ticket_id: change.ticket_id,
                old_status: change.old_status,
                new_status: change.new_status,
                delta: change.delta,
            },
            TicketEvent::MessageAppended { ticket_id, message } => {
                Self::MessageAppended { ticket_id, message }
            },
        }
    }
}
