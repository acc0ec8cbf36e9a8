//! Committed-change events and the publisher seam.
//!
//! Every successful ticket mutation emits exactly one [`TicketEvent`]
//! to the fan-out bus before the mutating call returns. The bus is the
//! sole announcer: callers never re-publish what they just did, which
//! eliminates the duplicate-announce race between the request/response
//! channel and the real-time channel.
//!
//! # Delivery contract
//!
//! - At-least-once per committed mutation, per connected subscriber
//! - Events for one ticket reach a given subscriber in publish order
//! - No buffering or replay; a disconnected subscriber misses events
//!   and self-heals via counter resync
//!
//! Subscribers must therefore tolerate duplicates and gaps; the
//! precomputed `delta` plus periodic resync make that cheap.

use crate::types::{StatusChange, Ticket, TicketId, TicketMessage};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// An event describing one committed ticket mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TicketEvent {
    /// A ticket was created (always with status `open`).
    Created {
        /// The newly created ticket, thread included
        ticket: Ticket,
    },
    /// A ticket's status and/or priority changed. Carries the badge
    /// delta so subscribers never re-derive it. A priority-only update
    /// arrives here with `old_status == new_status` and `delta == 0`.
    StatusChanged {
        /// Old/new status and the open-count delta
        change: StatusChange,
    },
    /// A message was appended to a ticket's thread.
    MessageAppended {
        /// The ticket whose thread grew
        ticket_id: TicketId,
        /// The appended message
        message: TicketMessage,
    },
}

impl TicketEvent {
    /// The ticket this event belongs to.
    #[must_use]
    pub const fn ticket_id(&self) -> TicketId {
        match self {
            Self::Created { ticket } => ticket.id,
            Self::StatusChanged { change } => change.ticket_id,
            Self::MessageAppended { ticket_id, .. } => *ticket_id,
        }
    }

    /// Whether list/badge views (the global topic) care about this
    /// event. Message traffic stays scoped to the ticket room.
    #[must_use]
    pub const fn is_list_relevant(&self) -> bool {
        matches!(self, Self::Created { .. } | Self::StatusChanged { .. })
    }
}

/// Publisher seam between the ticket store and the fan-out bus.
///
/// Publishing is fire-and-forget: a publish with no listening
/// subscribers is not an error, and the store never waits on delivery.
///
/// # Dyn Compatibility
///
/// Uses an explicit `Pin<Box<dyn Future>>` return instead of
/// `async fn` so the store can hold an `Arc<dyn TicketEventPublisher>`.
pub trait TicketEventPublisher: Send + Sync {
    /// Publish one committed event. Must not fail the mutation that
    /// produced it.
    fn publish(&self, event: TicketEvent) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Publisher that discards every event. Useful when wiring a store
/// with no real-time layer attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPublisher;

impl TicketEventPublisher for NullPublisher {
    fn publish(&self, _event: TicketEvent) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async {})
    }
}
