//! # Supportdesk Client
//!
//! Client-side counter reconciliation for the complaint
//! synchronization core. This logic lives with the connecting client
//! (customer app or admin console), but it is specified and tested
//! here because its correctness depends entirely on the fan-out bus's
//! weak delivery guarantees.
//!
//! ## Protocol
//!
//! 1. On connect: fetch the authoritative open count and cache it
//! 2. On `ticket_created`: increment
//! 3. On `status_changed`: apply the event's precomputed delta,
//!    clamped at zero
//! 4. On a local status change: apply the same delta optimistically,
//!    before the server round trip completes
//! 5. Periodically: overwrite the cache with the store's truth
//!
//! Steps 2-4 are latency optimizations. Step 5 is the system of
//! record: after any missed or duplicated event the cache converges
//! within one resync interval.

pub mod counter;
pub mod resync;

pub use counter::OpenTicketCounter;
pub use resync::{
    CounterHandle, OpenCountSource, ResyncTask, BADGE_RESYNC_INTERVAL, SECONDARY_RESYNC_INTERVAL,
};
