//! The open-ticket counter: a client-side cache reconciled against
//! the store.
//!
//! The counter is a pure state machine. It applies three kinds of
//! input:
//!
//! 1. **Observed events** from the fan-out bus (`created` → +1,
//!    `status_changed` → the precomputed delta)
//! 2. **Optimistic local deltas**, applied immediately when this
//!    client performs its own status change, before the server round
//!    trip completes
//! 3. **Resync overwrites**, which replace the cache with the store's
//!    authoritative count unconditionally
//!
//! Deltas are a latency optimization only; resync is the system of
//! record. The count is clamped at zero, so a duplicate or unmatched
//! decrement can never drive it negative, and any drift from missed
//! or doubled events is erased by the next resync.

use chrono::{DateTime, Utc};
use supportdesk_core::event::TicketEvent;
use supportdesk_core::status::open_count_delta;
use supportdesk_core::types::Status;

/// Per-client cached view of "how many tickets are open".
///
/// Ephemeral: never persisted, rebuilt from a resync on connect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenTicketCounter {
    /// Locally cached open-ticket count
    open_count: u64,
    /// When the cache was last overwritten from the store
    last_resync_at: Option<DateTime<Utc>>,
}

impl OpenTicketCounter {
    /// A counter that has never synced (count zero).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            open_count: 0,
            last_resync_at: None,
        }
    }

    /// Current cached count.
    #[must_use]
    pub const fn open_count(&self) -> u64 {
        self.open_count
    }

    /// When the cache was last overwritten by a resync, if ever.
    #[must_use]
    pub const fn last_resync_at(&self) -> Option<DateTime<Utc>> {
        self.last_resync_at
    }

    /// Apply one observed event from the fan-out bus.
    ///
    /// Message traffic does not touch the badge; creations add one;
    /// status changes apply their precomputed delta, clamped at zero.
    pub fn observe(&mut self, event: &TicketEvent) {
        match event {
            TicketEvent::Created { .. } => {
                self.open_count = self.open_count.saturating_add(1);
            },
            TicketEvent::StatusChanged { change } => {
                self.apply_delta(change.delta);
            },
            TicketEvent::MessageAppended { .. } => {},
        }
    }

    /// Optimistically apply this client's own status change before the
    /// server round trip completes. Uses the same delta formula as the
    /// status engine; the next resync reconciles it, so this update is
    /// responsive but never trusted.
    pub fn apply_local(&mut self, old: Status, new: Status) {
        self.apply_delta(open_count_delta(old, new));
    }

    /// Overwrite the cache with the store's authoritative count.
    /// Idempotent: applying the same truth twice is a no-op.
    pub fn apply_resync(&mut self, authoritative: u64, at: DateTime<Utc>) {
        self.open_count = authoritative;
        self.last_resync_at = Some(at);
    }

    /// Clamped signed add. A decrement without a matching increment
    /// (duplicate delivery) bottoms out at zero instead of wrapping.
    fn apply_delta(&mut self, delta: i64) {
        self.open_count = self.open_count.saturating_add_signed(delta);
    }
}
