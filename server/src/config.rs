//! Configuration management for the supportdesk server.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use supportdesk_core::TransitionPolicy;
use supportdesk_realtime::DEFAULT_ROOM_CAPACITY;
use supportdesk_web::MAX_ATTACHMENT_BYTES;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Real-time channel configuration
    pub realtime: RealtimeConfig,
    /// Ticket domain configuration
    pub tickets: TicketConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Log filter (`RUST_LOG` syntax)
    pub log_filter: String,
}

/// Real-time channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-room broadcast channel capacity; slow consumers past this
    /// depth lag and recover via resync
    pub room_capacity: usize,
}

/// Ticket domain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketConfig {
    /// Enforce the strict status transition table instead of allowing
    /// any transition
    pub strict_transitions: bool,
    /// Attachment size cap in bytes
    pub max_attachment_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparseable variables fall back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("SUPPORTDESK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SUPPORTDESK_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
                log_filter: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "supportdesk=info,tower_http=debug".to_string()),
            },
            realtime: RealtimeConfig {
                room_capacity: env::var("SUPPORTDESK_ROOM_CAPACITY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_ROOM_CAPACITY),
            },
            tickets: TicketConfig {
                strict_transitions: env::var("SUPPORTDESK_STRICT_TRANSITIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(false),
                max_attachment_bytes: env::var("SUPPORTDESK_MAX_ATTACHMENT_BYTES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(MAX_ATTACHMENT_BYTES),
            },
        }
    }

    /// Transition policy implied by the configuration.
    #[must_use]
    pub const fn transition_policy(&self) -> TransitionPolicy {
        if self.tickets.strict_transitions {
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::Permissive
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_environment() {
        // Env vars are process-global; rely on the unprefixed defaults
        let config = Config::from_env();
        assert_eq!(config.realtime.room_capacity, DEFAULT_ROOM_CAPACITY);
        assert_eq!(config.tickets.max_attachment_bytes, MAX_ATTACHMENT_BYTES);
    }

    #[test]
    fn strict_flag_selects_the_strict_policy() {
        let mut config = Config::from_env();
        config.tickets.strict_transitions = true;
        assert!(matches!(
            config.transition_policy(),
            TransitionPolicy::Strict
        ));
    }
}
