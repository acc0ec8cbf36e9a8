//! Room-based fan-out bus.
//!
//! Delivers committed [`TicketEvent`]s to all currently subscribed
//! connections with at-least-once semantics per connection:
//!
//! - `Created` and `StatusChanged` fan out to the ticket's room *and*
//!   the global topic (dashboards, badge views)
//! - `MessageAppended` fans out to the ticket's room only
//!
//! # Delivery contract
//!
//! The bus does not buffer or replay. A connection that is not
//! subscribed when an event fires simply never sees it; a lagging
//! receiver drops the oldest events. Both cases are expected and
//! self-heal via the periodic counter resync, so delivery loss is a
//! design acknowledgment here, never an error.
//!
//! A single subscriber observes events for one room in publish order.
//! Nothing is guaranteed across rooms or across subscribers.
//!
//! `publish` is safe to call concurrently with `subscribe`; a
//! connection joining mid-publish may miss that specific event, which
//! the at-least-once/self-healing contract allows.

use crate::room::Room;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use supportdesk_core::event::{TicketEvent, TicketEventPublisher};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

/// Default per-room channel capacity. A slow consumer that falls more
/// than this far behind starts losing the oldest events (and is
/// expected to resync).
pub const DEFAULT_ROOM_CAPACITY: usize = 256;

/// Type alias for the room map to reduce complexity.
type RoomMap = Arc<RwLock<HashMap<Room, broadcast::Sender<TicketEvent>>>>;

/// Fan-out bus mapping rooms to broadcast channels.
///
/// Cheap to clone; all clones share the same room map. Unsubscribing
/// is simply dropping the receiver - the bus holds no per-connection
/// state and never mutates ticket state.
pub struct RoomBus {
    /// Map of room → broadcast channel
    rooms: RoomMap,
    /// Capacity for newly created room channels
    capacity: usize,
}

impl RoomBus {
    /// Create a bus with [`DEFAULT_ROOM_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ROOM_CAPACITY)
    }

    /// Create a bus with an explicit per-room channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Subscribe to a room.
    ///
    /// Returns a receiver that observes every event published to the
    /// room from this moment on, in publish order. Dropping the
    /// receiver is the unsubscribe operation.
    pub async fn subscribe(&self, room: Room) -> broadcast::Receiver<TicketEvent> {
        let mut rooms = self.rooms.write().await;
        let sender = rooms
            .entry(room)
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        sender.subscribe()
    }

    /// Fan an event out to its room(s).
    ///
    /// List-relevant events (creation, status change) go to both the
    /// ticket room and the global topic; message traffic stays in the
    /// ticket room. Publishing to a room with no subscribers is a
    /// no-op, not an error.
    pub async fn publish(&self, event: &TicketEvent) {
        let ticket_room = Room::Ticket(event.ticket_id());
        self.send_to(ticket_room, event.clone()).await;
        if event.is_list_relevant() {
            self.send_to(Room::Global, event.clone()).await;
        }
    }

    /// Number of rooms with a live channel (subscribed at least once
    /// since the last prune).
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Drop channels that no longer have any receiver. Connection
    /// close cleanup: receivers are dropped by their connection tasks,
    /// and this reclaims the abandoned channels.
    pub async fn prune(&self) {
        let mut rooms = self.rooms.write().await;
        let before = rooms.len();
        rooms.retain(|_, sender| sender.receiver_count() > 0);
        let pruned = before - rooms.len();
        if pruned > 0 {
            debug!(pruned, remaining = rooms.len(), "Pruned empty rooms");
        }
    }

    async fn send_to(&self, room: Room, event: TicketEvent) {
        let rooms = self.rooms.read().await;
        if let Some(sender) = rooms.get(&room) {
            // Send error just means no receivers right now; the event
            // is advisory and resync covers the gap.
            let delivered = sender.send(event).unwrap_or(0);
            debug!(room = %room, delivered, "Event fanned out");
        } else {
            debug!(room = %room, "No channel for room, event dropped");
        }
    }
}

impl Default for RoomBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RoomBus {
    fn clone(&self) -> Self {
        Self {
            rooms: Arc::clone(&self.rooms),
            capacity: self.capacity,
        }
    }
}

impl TicketEventPublisher for RoomBus {
    fn publish(&self, event: TicketEvent) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move { Self::publish(self, &event).await })
    }
}
