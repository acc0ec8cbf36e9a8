//! REST handlers for the ticket mutation/query surface.
//!
//! Mutations commit through the store, which publishes to the fan-out
//! bus before returning; these handlers never announce anything on the
//! real-time channel themselves.

use crate::error::AppError;
use crate::extractors::Json;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use supportdesk_core::types::{
    Category, NewTicket, OrderId, Priority, SenderRole, Status, StatusChange, Ticket, TicketId,
    TicketMessage, UserId,
};
use tracing::debug;
use uuid::Uuid;

/// Request body for `POST /tickets`.
#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
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
    #[serde(default)]
    pub attachment: Option<String>,
}

/// Request body for `PUT /tickets/:id/status`.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    /// Target status
    pub status: Status,
    /// Optional new priority
    #[serde(default)]
    pub priority: Option<Priority>,
}

/// Which view of the ticket list is requested.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Tickets filed by one requester
    User,
    /// Every ticket (dashboard view)
    #[default]
    Admin,
}

/// Query parameters for `GET /tickets`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `user` or `admin` (default `admin`)
    #[serde(default)]
    pub scope: Scope,
    /// Optional status filter
    #[serde(default)]
    pub status: Option<Status>,
    /// Requester id, required when `scope=user`
    #[serde(default)]
    pub user: Option<UserId>,
}

/// Response body for `GET /tickets`: the tickets plus the open count
/// derived purely from stored state, independent of any client cache.
#[derive(Debug, Serialize)]
pub struct TicketListResponse {
    /// Matching tickets
    pub tickets: Vec<Ticket>,
    /// Authoritative count of open tickets in the store
    pub open_count: usize,
}

/// `POST /tickets` - create a complaint.
///
/// Always creates with status `open`; the initial message becomes the
/// first thread entry.
///
/// # Errors
///
/// 400 when the subject is blank or the initial message is empty with
/// no attachment.
pub async fn create_ticket(
    State(state): State<AppState>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), AppError> {
    let ticket = state
        .store
        .create_ticket(NewTicket {
            subject: req.subject,
            category: req.category,
            order: req.order,
            requester: req.requester,
            body: req.body,
            attachment: req.attachment,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// `GET /tickets/:id` - fetch one ticket with its thread.
///
/// # Errors
///
/// 404 when the ticket does not exist.
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ticket>, AppError> {
    let ticket = state.store.get(TicketId::from_uuid(id)).await?;
    Ok(Json(ticket))
}

/// `GET /tickets?scope=user|admin&status=...&user=...` - list tickets.
///
/// The `open_count` in the response is computed from stored tickets
/// only; it is the resync target for client badges.
///
/// # Errors
///
/// 400 when `scope=user` without a `user` parameter.
pub async fn list_tickets(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<TicketListResponse>, AppError> {
    let tickets = match query.scope {
        Scope::Admin => state.store.list(query.status).await,
        Scope::User => {
            let user = query
                .user
                .ok_or_else(|| AppError::bad_request("scope=user requires a user parameter"))?;
            let mut tickets = state.store.list_for_requester(user).await;
            if let Some(status) = query.status {
                tickets.retain(|t| t.status == status);
            }
            tickets
        },
    };
    let open_count = state.store.count_open().await;
    Ok(Json(TicketListResponse {
        tickets,
        open_count,
    }))
}

/// `PUT /tickets/:id/status` - change status and/or priority.
///
/// Returns old and new status plus the badge delta so the acting
/// client can apply its optimistic update without re-deriving it.
///
/// # Errors
///
/// 404 for an unknown ticket; 400 for a transition rejected by the
/// strict policy (when configured).
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<StatusChange>, AppError> {
    let change = state
        .store
        .set_status(TicketId::from_uuid(id), req.status, req.priority)
        .await?;
    Ok(Json(change))
}

/// `POST /tickets/:id/messages` - append a message (multipart).
///
/// Fields: `body` (text), optional `sender` (`requester`/`support`,
/// default requester), optional `attachment` (binary, ≤ 5 MB; the
/// filename becomes the opaque attachment reference, storage itself
/// is the out-of-scope collaborator's concern).
///
/// # Errors
///
/// 404 for an unknown ticket, 409 when the ticket is closed, 400 for
/// an oversized attachment or an empty message.
pub async fn append_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<TicketMessage>), AppError> {
    let mut body = String::new();
    let mut sender = SenderRole::Requester;
    let mut attachment: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("body") => {
                body = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(format!("unreadable body field: {e}")))?;
            },
            Some("sender") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(format!("unreadable sender field: {e}")))?;
                sender = parse_sender(&raw)?;
            },
            Some("attachment") => {
                let file_name = field.file_name().map(ToString::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::bad_request(format!("unreadable attachment field: {e}"))
                })?;
                if bytes.len() > state.max_attachment_bytes {
                    return Err(AppError::attachment_too_large(state.max_attachment_bytes));
                }
                debug!(size = bytes.len(), file_name = ?file_name, "Attachment received");
                attachment = Some(
                    file_name
                        .unwrap_or_else(|| format!("attachment-{}", Uuid::new_v4())),
                );
            },
            _ => {},
        }
    }

    let message = state
        .store
        .append_message(TicketId::from_uuid(id), sender, body, attachment)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

fn parse_sender(raw: &str) -> Result<SenderRole, AppError> {
    match raw {
        "requester" => Ok(SenderRole::Requester),
        "support" => Ok(SenderRole::Support),
        other => Err(AppError::bad_request(format!(
            "unknown sender role: {other}"
        ))),
    }
}
