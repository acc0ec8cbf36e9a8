//! Error taxonomy for ticket store and status engine operations.
//!
//! Store and engine errors propagate synchronously to the calling
//! request. Delivery gaps on the real-time layer are deliberately not
//! errors; they surface only as temporary staleness corrected by
//! resync.

use crate::types::{Status, TicketId};
use thiserror::Error;

/// Errors raised by ticket mutations and queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// A required field is missing or an enum value is malformed.
    /// Rejected synchronously, never retried, surfaced verbatim.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The ticket id does not exist.
    #[error("ticket {0} not found")]
    NotFound(TicketId),

    /// The ticket is closed and accepts no further messages.
    #[error("ticket {0} is closed")]
    Closed(TicketId),

    /// The transition is not allowed under the strict transition
    /// policy. Never raised under the default permissive policy.
    #[error("invalid status transition: {old} -> {new}")]
    InvalidTransition {
        /// Status before the rejected transition
        old: Status,
        /// Requested target status
        new: Status,
    },
}

impl TicketError {
    /// Convenience constructor for validation failures.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn display_names_the_transition() {
        let err = TicketError::InvalidTransition {
            old: Status::Closed,
            new: Status::InProgress,
        };
        assert_eq!(
            err.to_string(),
            "invalid status transition: closed -> in_progress"
        );
    }
}
