//! The ticket store: source of truth for tickets, threads, and status.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────────┐
//! │   Request   │────>│ TicketStore  │────>│  1. Commit      │
//! └─────────────┘     │  (write lock)│     │     mutation    │
//!                     └──────────────┘     └────────┬────────┘
//!                                                   │
//!                                                   ▼
//!                                          ┌─────────────────┐
//!                                          │  2. Publish     │
//!                                          │  TicketEvent    │◄── at-least-once
//!                                          └─────────────────┘
//! ```
//!
//! Mutations are serialized per ticket by the single write lock, so a
//! ticket's history is totally ordered and the last `set_status` call
//! always wins. The store publishes each committed mutation to the
//! fan-out seam *while still holding the write lock*, which keeps
//! publish order identical to commit order for any one ticket.
//!
//! Tickets are never deleted; `closed` is a soft terminal state that
//! only refuses further messages.

use crate::clock::Clock;
use crate::error::TicketError;
use crate::event::{TicketEvent, TicketEventPublisher};
use crate::status::{open_count_delta, TransitionPolicy};
use crate::types::{
    NewTicket, Priority, SenderRole, Status, StatusChange, Ticket, TicketId, TicketMessage, UserId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// In-process source of truth for tickets.
///
/// Cheap to share: wrap in an `Arc` and clone the handle. The fan-out
/// bus never mutates this store; it only observes the events the store
/// publishes after commit.
pub struct TicketStore {
    /// Ticket map. The single write lock is the per-ticket
    /// single-writer discipline; tickets are independent aggregates so
    /// no finer locking is needed.
    tickets: RwLock<HashMap<TicketId, Ticket>>,
    /// Timestamp source for commits
    clock: Arc<dyn Clock>,
    /// Fan-out seam; receives exactly one event per committed mutation
    publisher: Arc<dyn TicketEventPublisher>,
    /// Transition validation policy (permissive by default)
    policy: TransitionPolicy,
}

impl TicketStore {
    /// Create a store with the default permissive transition policy.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, publisher: Arc<dyn TicketEventPublisher>) -> Self {
        Self::with_policy(clock, publisher, TransitionPolicy::Permissive)
    }

    /// Create a store with an explicit transition policy.
    #[must_use]
    pub fn with_policy(
        clock: Arc<dyn Clock>,
        publisher: Arc<dyn TicketEventPublisher>,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            tickets: RwLock::new(HashMap::new()),
            clock,
            publisher,
            policy,
        }
    }

    /// Create a ticket. Always starts with status `open`; the initial
    /// message becomes the first entry of the thread, authored by the
    /// requester.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Validation`] when the subject is blank
    /// or the initial message has neither body nor attachment.
    pub async fn create_ticket(&self, new: NewTicket) -> Result<Ticket, TicketError> {
        if new.subject.trim().is_empty() {
            return Err(TicketError::validation("subject must not be blank"));
        }
        validate_message(&new.body, new.attachment.as_deref())?;

        let now = self.clock.now();
        let ticket = Ticket {
            id: TicketId::new(),
            subject: new.subject,
            category: new.category,
            priority: Priority::default(),
            status: Status::Open,
            requester: new.requester,
            order: new.order,
            messages: vec![TicketMessage {
                sender: SenderRole::Requester,
                body: new.body,
                attachment: new.attachment,
                sent_at: now,
            }],
            created_at: now,
        };

        let mut tickets = self.tickets.write().await;
        tickets.insert(ticket.id, ticket.clone());
        info!(ticket_id = %ticket.id, category = ?ticket.category, "Ticket created");
        // Publish under the write lock so publish order == commit order.
        self.publisher
            .publish(TicketEvent::Created {
                ticket: ticket.clone(),
            })
            .await;
        Ok(ticket)
    }

    /// Append a message to a ticket's thread.
    ///
    /// The timestamp is the server clock at commit; the append is
    /// atomic and the thread never shrinks.
    ///
    /// # Errors
    ///
    /// - [`TicketError::NotFound`] for an unknown ticket id
    /// - [`TicketError::Closed`] when the ticket is closed (the thread
    ///   does not grow)
    /// - [`TicketError::Validation`] when body and attachment are both
    ///   absent
    pub async fn append_message(
        &self,
        ticket_id: TicketId,
        sender: SenderRole,
        body: String,
        attachment: Option<String>,
    ) -> Result<TicketMessage, TicketError> {
        validate_message(&body, attachment.as_deref())?;

        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .get_mut(&ticket_id)
            .ok_or(TicketError::NotFound(ticket_id))?;
        if ticket.status == Status::Closed {
            return Err(TicketError::Closed(ticket_id));
        }

        let message = TicketMessage {
            sender,
            body,
            attachment,
            sent_at: self.clock.now(),
        };
        ticket.messages.push(message.clone());
        debug!(ticket_id = %ticket_id, sender = ?sender, thread_len = ticket.messages.len(), "Message appended");
        self.publisher
            .publish(TicketEvent::MessageAppended {
                ticket_id,
                message: message.clone(),
            })
            .await;
        Ok(message)
    }

    /// Change a ticket's status and optionally its priority.
    ///
    /// Returns the old and new status plus the badge delta so callers
    /// can apply optimistic updates without re-deriving the formula.
    /// A priority-only update passes the current status unchanged and
    /// yields a zero delta, but still publishes so dashboards refresh.
    ///
    /// # Errors
    ///
    /// - [`TicketError::NotFound`] for an unknown ticket id
    /// - [`TicketError::InvalidTransition`] only under
    ///   [`TransitionPolicy::Strict`]
    pub async fn set_status(
        &self,
        ticket_id: TicketId,
        new_status: Status,
        new_priority: Option<Priority>,
    ) -> Result<StatusChange, TicketError> {
        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .get_mut(&ticket_id)
            .ok_or(TicketError::NotFound(ticket_id))?;

        let old_status = ticket.status;
        self.policy.check(old_status, new_status)?;

        ticket.status = new_status;
        if let Some(priority) = new_priority {
            ticket.priority = priority;
        }

        let change = StatusChange {
            ticket_id,
            old_status,
            new_status,
            delta: open_count_delta(old_status, new_status),
        };
        info!(
            ticket_id = %ticket_id,
            old = %old_status,
            new = %new_status,
            delta = change.delta,
            "Status changed"
        );
        self.publisher
            .publish(TicketEvent::StatusChanged { change })
            .await;
        Ok(change)
    }

    /// Fetch one ticket by id.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::NotFound`] for an unknown id.
    pub async fn get(&self, ticket_id: TicketId) -> Result<Ticket, TicketError> {
        self.tickets
            .read()
            .await
            .get(&ticket_id)
            .cloned()
            .ok_or(TicketError::NotFound(ticket_id))
    }

    /// List tickets, optionally filtered by status. Finite and
    /// restartable; ordered by creation time (then id) so repeated
    /// listings are stable.
    pub async fn list(&self, filter_by_status: Option<Status>) -> Vec<Ticket> {
        let tickets = self.tickets.read().await;
        let mut out: Vec<Ticket> = tickets
            .values()
            .filter(|t| filter_by_status.is_none_or(|s| t.status == s))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        out
    }

    /// List tickets filed by one requester (the `scope=user` view).
    pub async fn list_for_requester(&self, requester: UserId) -> Vec<Ticket> {
        let mut out: Vec<Ticket> = self
            .tickets
            .read()
            .await
            .values()
            .filter(|t| t.requester == requester)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        out
    }

    /// Authoritative count of tickets with status `open`. This is the
    /// resync source of truth; client-side caches are overwritten with
    /// this value, never the other way around.
    pub async fn count_open(&self) -> usize {
        self.tickets
            .read()
            .await
            .values()
            .filter(|t| t.status.is_open())
            .count()
    }

    /// Whether a ticket exists (used by room joins to reject unknown
    /// rooms before subscribing).
    pub async fn exists(&self, ticket_id: TicketId) -> bool {
        self.tickets.read().await.contains_key(&ticket_id)
    }
}

/// A message must carry text, an attachment, or both.
fn validate_message(body: &str, attachment: Option<&str>) -> Result<(), TicketError> {
    if body.trim().is_empty() && attachment.is_none() {
        return Err(TicketError::validation(
            "message body may be empty only if an attachment is present",
        ));
    }
    Ok(())
}
