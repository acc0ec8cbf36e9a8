//! Room addressing for the fan-out bus.
//!
//! Two topic shapes exist: a per-ticket room scoping message and
//! status traffic to the participants of one ticket, and a single
//! global topic consumed by dashboards and badge views.

use std::fmt;
use supportdesk_core::types::TicketId;

/// A logical pub/sub channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Room {
    /// Events scoped to the participants of one ticket
    /// (string form `ticket:<id>`).
    Ticket(TicketId),
    /// List-level events (`ticket_created`, `status_changed`)
    /// consumed by dashboards.
    Global,
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ticket(id) => write!(f, "ticket:{id}"),
            Self::Global => write!(f, "global"),
        }
    }
}
