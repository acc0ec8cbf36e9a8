//! Router configuration for the supportdesk server.
//!
//! Builds the complete Axum router with all endpoints.

use crate::handlers::health::{health_check, readiness_check};
use crate::handlers::{tickets, websocket};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

/// Body limit for multipart message uploads: the attachment cap plus
/// headroom for the text fields and multipart framing.
const BODY_LIMIT_SLACK_BYTES: usize = 64 * 1024;

/// Build the complete Axum router.
///
/// Configures all routes including:
/// - Health checks
/// - Ticket CRUD and status endpoints
/// - Message append (multipart)
/// - The WebSocket real-time channel
///
/// # Arguments
///
/// - `state`: Application state to share with handlers
///
/// # Returns
///
/// Configured Axum router ready to serve requests.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_attachment_bytes + BODY_LIMIT_SLACK_BYTES;

    let api_routes = Router::new()
        // Ticket management
        .route("/tickets", post(tickets::create_ticket))
        .route("/tickets", get(tickets::list_tickets))
        .route("/tickets/:id", get(tickets::get_ticket))
        .route("/tickets/:id/status", put(tickets::set_status))
        // Thread messages (multipart; sized for the attachment cap so
        // the handler, not Axum's default limit, decides oversize)
        .route("/tickets/:id/messages", post(tickets::append_message))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        // Health checks (no authentication)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Real-time channel
        .route("/ws", get(websocket::handle))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
