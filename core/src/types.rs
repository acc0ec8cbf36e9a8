//! Domain types for the support ticket synchronization core.
//!
//! This module contains the value objects and entities shared by the
//! ticket store, the fan-out bus, and the counter reconciliation
//! service: identifiers, enums, the [`Ticket`] aggregate, and its
//! append-only [`TicketMessage`] thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Creates a new random `TicketId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TicketId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for the order a complaint is tied to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new random `OrderId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `OrderId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user (requester or support staff)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random `UserId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `UserId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Complaint category chosen by the requester at creation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Food quality issue (cold, stale, inedible)
    ProductQuality,
    /// An ordered item was missing from the delivery
    MissingItem,
    /// An item arrived damaged or spilled
    DamagedItem,
    /// Late delivery, wrong address, courier problems
    DeliveryIssue,
    /// Anything else
    Other,
}

/// Ticket priority. Defaults to [`Priority::Medium`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Low urgency
    Low,
    /// Normal urgency (default)
    #[default]
    Medium,
    /// High urgency
    High,
}

/// Ticket lifecycle status. Defaults to [`Status::Open`].
///
/// The lifecycle is deliberately cyclic: a resolved or closed ticket
/// may be reopened. See the status engine in [`crate::status`] for the
/// counter-delta semantics attached to transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Newly filed, awaiting support
    #[default]
    Open,
    /// Support staff is actively working the ticket
    InProgress,
    /// Support considers the complaint addressed
    Resolved,
    /// Soft-deleted; no further messages accepted
    Closed,
}

impl Status {
    /// Whether this status counts toward the "open tickets" badge.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Open, Self::InProgress, Self::Resolved, Self::Closed];
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

/// Who authored a message in the ticket thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    /// The customer who filed the complaint
    Requester,
    /// Support staff
    Support,
}

// ============================================================================
// Entities
// ============================================================================

/// One message in a ticket's thread.
///
/// Messages are immutable once appended. The body may be empty only if
/// an attachment reference is present; the store enforces this at
/// append time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketMessage {
    /// Who sent the message
    pub sender: SenderRole,
    /// Message text (possibly empty when an attachment is present)
    pub body: String,
    /// Opaque attachment reference (filename/path); size limits are
    /// enforced at the transport boundary, not here
    pub attachment: Option<String>,
    /// Server clock at commit time
    pub sent_at: DateTime<Utc>,
}

/// A customer complaint tied to an order, with its message thread.
///
/// The ticket store owns persistence exclusively; everything else
/// observes committed state through events or reads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier
    pub id: TicketId,
    /// Short summary of the complaint
    pub subject: String,
    /// Complaint category
    pub category: Category,
    /// Current priority
    pub priority: Priority,
    /// Current lifecycle status
    pub status: Status,
    /// The customer who filed the ticket
    pub requester: UserId,
    /// The order the complaint is about
    pub order: OrderId,
    /// Append-only message thread, insertion order == chronological order
    pub messages: Vec<TicketMessage>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for creating a ticket.
///
/// The initial message is appended as the first entry of the thread,
/// authored by the requester.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewTicket {
    /// Short summary of the complaint
    pub subject: String,
    /// Complaint category
    pub category: Category,
    /// The order the complaint is about
    pub order: OrderId,
    /// The customer filing the ticket
    pub requester: UserId,
    /// Body of the initial message
    pub body: String,
    /// Optional attachment reference for the initial message
    pub attachment: Option<String>,
}

/// Result of a status mutation: old and new status plus the badge
/// delta, so callers never re-derive the delta from full state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// The mutated ticket
    pub ticket_id: TicketId,
    /// Status before the mutation
    pub old_status: Status,
    /// Status after the mutation
    pub new_status: Status,
    /// Open-count delta for this transition (see [`crate::status`])
    pub delta: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            r#""in_progress""#
        );
        let parsed: Status = serde_json::from_str(r#""resolved""#).unwrap();
        assert_eq!(parsed, Status::Resolved);
    }

    #[test]
    fn defaults_match_lifecycle_entry_point() {
        assert_eq!(Status::default(), Status::Open);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn only_open_counts_toward_badge() {
        assert!(Status::Open.is_open());
        assert!(!Status::InProgress.is_open());
        assert!(!Status::Resolved.is_open());
        assert!(!Status::Closed.is_open());
    }
}
