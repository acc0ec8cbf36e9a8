//! Application state for the supportdesk HTTP server.
//!
//! Contains the shared resources every handler needs: the ticket
//! store (source of truth), the fan-out bus, and the room
//! authorization seam. Cloned cheaply (via `Arc`) per request.

use std::sync::Arc;
use supportdesk_core::TicketStore;
use supportdesk_realtime::{RoomAuthorizer, RoomBus};

/// Maximum attachment size accepted by the message endpoint (5 MB);
/// enforced at this boundary, not by the store.
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of truth for tickets; the only component that mutates them
    pub store: Arc<TicketStore>,
    /// Fan-out bus the store publishes committed mutations to
    pub bus: RoomBus,
    /// Session-gateway seam deciding room joins
    pub gateway: Arc<dyn RoomAuthorizer>,
    /// Attachment size cap in bytes
    pub max_attachment_bytes: usize,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<TicketStore>, bus: RoomBus, gateway: Arc<dyn RoomAuthorizer>) -> Self {
        Self {
            store,
            bus,
            gateway,
            max_attachment_bytes: MAX_ATTACHMENT_BYTES,
        }
    }

    /// Override the attachment size cap (tests, constrained deploys).
    #[must_use]
    pub const fn with_max_attachment_bytes(mut self, limit: usize) -> Self {
        self.max_attachment_bytes = limit;
        self
    }
}
