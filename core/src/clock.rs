//! Clock seam - abstracts time operations for testability.

use chrono::{DateTime, Utc};

/// Clock trait - message and ticket timestamps come from here, never
/// from `Utc::now()` inline, so tests can pin time.
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
