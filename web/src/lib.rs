//! Axum HTTP and WebSocket surface for the supportdesk sync core.
//!
//! This crate is the imperative shell around the synchronization core:
//! request parsing, response serialization, and the persistent
//! real-time channel. All ticket mutations flow through
//! [`supportdesk_core::TicketStore`], whose commits drive the
//! [`supportdesk_realtime::RoomBus`] fan-out; handlers here never
//! publish events themselves.
//!
//! # Request Flow
//!
//! 1. **HTTP request** arrives at an Axum handler
//! 2. **Extract data** from the request (JSON, path, multipart)
//! 3. **Call the store**, the single writer for ticket state
//! 4. **The store publishes** the committed mutation to the bus
//! 5. **Map result** to an HTTP response (domain errors → status codes)
//!
//! WebSocket clients receive the published events for the rooms they
//! joined; the HTTP response and the fan-out describe the same commit.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use routes::build_router;
pub use state::{AppState, MAX_ATTACHMENT_BYTES};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
