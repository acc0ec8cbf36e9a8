//! Supportdesk HTTP server.
//!
//! Wires the synchronization core together: the ticket store commits
//! mutations and publishes them to the room bus, which fans them out
//! to WebSocket subscribers, while the REST surface serves the same
//! store as the resync source of truth.

use std::sync::Arc;
use supportdesk_core::{SystemClock, TicketStore};
use supportdesk_realtime::{OpenGateway, RoomBus};
use supportdesk_web::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Supportdesk HTTP server");
    info!(
        room_capacity = config.realtime.room_capacity,
        strict_transitions = config.tickets.strict_transitions,
        max_attachment_bytes = config.tickets.max_attachment_bytes,
        "Configuration loaded"
    );

    // The bus is the store's publisher: every committed mutation fans
    // out through it, and nothing else publishes.
    let bus = RoomBus::with_capacity(config.realtime.room_capacity);
    let store = Arc::new(TicketStore::with_policy(
        Arc::new(SystemClock),
        Arc::new(bus.clone()),
        config.transition_policy(),
    ));

    let state = AppState::new(store, bus, Arc::new(OpenGateway))
        .with_max_attachment_bytes(config.tickets.max_attachment_bytes);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {addr}");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for:
/// - Ctrl+C (SIGINT)
/// - SIGTERM (in production environments)
#[allow(clippy::expect_used)] // Signal handlers install once at startup
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
