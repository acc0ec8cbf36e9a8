//! # Supportdesk Core
//!
//! Ticket domain model, status engine, and store for the real-time
//! complaint synchronization core of a food-delivery platform.
//!
//! ## Components
//!
//! - [`types`]: identifiers, enums, the [`Ticket`](types::Ticket)
//!   aggregate and its append-only message thread
//! - [`status`]: the transition policy and the open-count delta table
//! - [`store`]: the source of truth; serialized per ticket, publishes
//!   one event per committed mutation
//! - [`event`]: committed-change events and the publisher seam the
//!   fan-out bus plugs into
//! - [`clock`]: injectable time, so commit timestamps are testable
//!
//! ## Design principles
//!
//! - The store exclusively owns persistence; the real-time layer only
//!   observes committed changes and republishes them
//! - Incremental deltas are a latency optimization; authoritative
//!   state always comes from the store (resync overwrites caches)
//! - Delivery loss on the real-time layer is normal, not an error;
//!   the system is designed for convergence

pub mod clock;
pub mod error;
pub mod event;
pub mod status;
pub mod store;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use error::TicketError;
pub use event::{NullPublisher, TicketEvent, TicketEventPublisher};
pub use status::{open_count_delta, TransitionPolicy};
pub use store::TicketStore;
pub use types::{
    Category, NewTicket, OrderId, Priority, SenderRole, Status, StatusChange, Ticket, TicketId,
    TicketMessage, UserId,
};
