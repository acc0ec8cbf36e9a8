//! # Supportdesk Testing
//!
//! Testing utilities shared by the workspace:
//! - Mock implementations of the core seams (clock, event publisher)
//! - Builders for common test fixtures
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use supportdesk_core::TicketStore;
//! use supportdesk_testing::mocks::{test_clock, RecordingPublisher};
//!
//! # tokio_test::block_on(async {
//! let publisher = Arc::new(RecordingPublisher::default());
//! let store = TicketStore::new(Arc::new(test_clock()), publisher.clone());
//! let ticket = store
//!     .create_ticket(supportdesk_testing::fixtures::cold_order_complaint())
//!     .await
//!     .unwrap();
//! assert_eq!(publisher.events().len(), 1);
//! # });
//! ```

use chrono::{DateTime, Utc};
use supportdesk_core::clock::Clock;
use supportdesk_core::event::{TicketEvent, TicketEventPublisher};

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, TicketEvent, TicketEventPublisher, Utc};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to
    /// parse, which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Publisher that records every published event for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingPublisher {
        events: Mutex<Vec<TicketEvent>>,
    }

    impl RecordingPublisher {
        /// Snapshot of everything published so far, in publish order.
        ///
        /// # Panics
        ///
        /// Panics if the internal mutex is poisoned, which only
        /// happens after a panic in another test thread.
        #[must_use]
        #[allow(clippy::unwrap_used)]
        pub fn events(&self) -> Vec<TicketEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl TicketEventPublisher for RecordingPublisher {
        #[allow(clippy::unwrap_used)]
        fn publish(&self, event: TicketEvent) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
            self.events.lock().unwrap().push(event);
            Box::pin(async {})
        }
    }
}

/// Fixture builders for common test scenarios.
pub mod fixtures {
    use supportdesk_core::types::{Category, NewTicket, OrderId, UserId};

    /// A typical complaint: food arrived cold.
    #[must_use]
    pub fn cold_order_complaint() -> NewTicket {
        NewTicket {
            subject: "Order arrived cold".to_string(),
            category: Category::ProductQuality,
            order: OrderId::new(),
            requester: UserId::new(),
            body: "Everything in the order was cold on arrival".to_string(),
            attachment: None,
        }
    }

    /// A complaint filed by a specific requester.
    #[must_use]
    pub fn complaint_from(requester: UserId) -> NewTicket {
        NewTicket {
            requester,
            ..cold_order_complaint()
        }
    }
}

pub use mocks::{test_clock, FixedClock, RecordingPublisher};
