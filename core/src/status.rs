//! Status engine: transition policy and open-count deltas.
//!
//! The lifecycle is terminal-free and cyclic. Under the default
//! [`TransitionPolicy::Permissive`] no transition is rejected on
//! domain grounds (reopening a resolved or closed ticket is a product
//! feature); the engine's real job is computing the signed delta the
//! "open tickets" badge applies for a transition:
//!
//! - `+1` when leaving `resolved`/`closed` for `open`
//! - `-1` when leaving `open` for `resolved`/`closed`
//! - `0`  for every other pair, `in_progress` in either direction
//!   included
//!
//! The delta rides on the committed event so subscribers apply an
//! incremental update without re-deriving it from full ticket state.

use crate::error::TicketError;
use crate::types::Status;

/// Signed open-count delta for a status transition.
#[must_use]
pub const fn open_count_delta(old: Status, new: Status) -> i64 {
    match (old, new) {
        (Status::Resolved | Status::Closed, Status::Open) => 1,
        (Status::Open, Status::Resolved | Status::Closed) => -1,
        _ => 0,
    }
}

/// How strictly the store validates status transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any status may move to any status. Matches the shipped product
    /// behavior (reopen-after-close).
    #[default]
    Permissive,
    /// Only the edges in [`STRICT_EDGES`] are allowed; everything else
    /// is rejected with [`TicketError::InvalidTransition`].
    Strict,
}

/// Allowed edges under [`TransitionPolicy::Strict`], as an explicit
/// table rather than an implicit rule set.
pub const STRICT_EDGES: [(Status, Status); 8] = [
    (Status::Open, Status::InProgress),
    (Status::Open, Status::Resolved),
    (Status::Open, Status::Closed),
    (Status::InProgress, Status::Open),
    (Status::InProgress, Status::Resolved),
    (Status::InProgress, Status::Closed),
    (Status::Resolved, Status::Closed),
    (Status::Closed, Status::Open),
];

impl TransitionPolicy {
    /// Validate a transition under this policy.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::InvalidTransition`] when the policy is
    /// [`TransitionPolicy::Strict`] and `(old, new)` is not in the
    /// edge table. Self-transitions are always allowed; they carry a
    /// zero delta and exist so priority-only updates can reuse the
    /// same code path.
    pub fn check(self, old: Status, new: Status) -> Result<(), TicketError> {
        match self {
            Self::Permissive => Ok(()),
            Self::Strict => {
                if old == new || STRICT_EDGES.contains(&(old, new)) {
                    Ok(())
                } else {
                    Err(TicketError::InvalidTransition { old, new })
                }
            },
        }
    }
}
