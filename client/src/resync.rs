//! Periodic authoritative resync.
//!
//! Incremental deltas keep the badge responsive; this module keeps it
//! correct. One subscription plus one explicit resync primitive,
//! parameterized by interval, replaces per-view refresh timers: the
//! badge-owning view runs it at a short cadence (5s observed), views
//! that only indirectly affect the count at a longer one (10s).
//!
//! Resync fetches the store's true open count and overwrites the local
//! cache unconditionally. After any missed or duplicated delivery the
//! cache therefore converges within one interval.

use crate::counter::OpenTicketCounter;
use chrono::Utc;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use supportdesk_core::event::TicketEvent;
use supportdesk_core::store::TicketStore;
use supportdesk_core::types::Status;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

/// Resync cadence for the badge-owning view.
pub const BADGE_RESYNC_INTERVAL: Duration = Duration::from_secs(5);
/// Resync cadence for views that affect the count only indirectly.
pub const SECONDARY_RESYNC_INTERVAL: Duration = Duration::from_secs(10);

/// Source of the authoritative open-ticket count.
///
/// Implemented by the in-process [`TicketStore`]; a remote client
/// would implement it over `GET /tickets?status=open`.
pub trait OpenCountSource: Send + Sync {
    /// The store's true count of tickets with status `open`.
    fn fetch_open_count(&self) -> Pin<Box<dyn Future<Output = u64> + Send + '_>>;
}

impl OpenCountSource for TicketStore {
    fn fetch_open_count(&self) -> Pin<Box<dyn Future<Output = u64> + Send + '_>> {
        Box::pin(async move { u64::try_from(self.count_open().await).unwrap_or(u64::MAX) })
    }
}

/// Shared handle around an [`OpenTicketCounter`].
///
/// One handle is shared between the event-observing task and the
/// resync task; clones are cheap and observe the same counter.
#[derive(Clone, Default)]
pub struct CounterHandle {
    inner: Arc<RwLock<OpenTicketCounter>>,
}

impl CounterHandle {
    /// A fresh, never-synced counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cached count.
    pub async fn open_count(&self) -> u64 {
        self.inner.read().await.open_count()
    }

    /// Snapshot of the counter state.
    pub async fn snapshot(&self) -> OpenTicketCounter {
        self.inner.read().await.clone()
    }

    /// Apply one observed fan-out event.
    pub async fn observe(&self, event: &TicketEvent) {
        self.inner.write().await.observe(event);
    }

    /// Optimistically apply this client's own status change.
    pub async fn apply_local(&self, old: Status, new: Status) {
        self.inner.write().await.apply_local(old, new);
    }

    /// Fetch the authoritative count and overwrite the cache.
    pub async fn resync(&self, source: &dyn OpenCountSource) {
        let authoritative = source.fetch_open_count().await;
        let mut counter = self.inner.write().await;
        let before = counter.open_count();
        counter.apply_resync(authoritative, Utc::now());
        if before != authoritative {
            debug!(before, authoritative, "Resync corrected counter drift");
        }
    }
}

/// Periodic resync driver.
///
/// The first tick fires immediately, which doubles as the on-connect
/// authoritative fetch; subsequent ticks overwrite the cache at the
/// configured interval. Aborting the handle stops the task.
pub struct ResyncTask {
    handle: JoinHandle<()>,
}

impl ResyncTask {
    /// Spawn a resync loop for `counter` against `source`.
    #[must_use]
    pub fn spawn(
        counter: CounterHandle,
        source: Arc<dyn OpenCountSource>,
        interval: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                counter.resync(source.as_ref()).await;
            }
        });
        Self { handle }
    }

    /// Stop the resync loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Drop for ResyncTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code
mod tests {
    use super::*;

    struct FixedSource(u64);

    impl OpenCountSource for FixedSource {
        fn fetch_open_count(&self) -> Pin<Box<dyn Future<Output = u64> + Send + '_>> {
            let n = self.0;
            Box::pin(async move { n })
        }
    }

    #[tokio::test]
    async fn resync_overwrites_drifted_cache() {
        let handle = CounterHandle::new();
        // Simulate drift from duplicated events.
        handle
            .observe(&supportdesk_core::event::TicketEvent::Created {
                ticket: drifted_ticket(),
            })
            .await;
        handle
            .observe(&supportdesk_core::event::TicketEvent::Created {
                ticket: drifted_ticket(),
            })
            .await;
        assert_eq!(handle.open_count().await, 2);

        handle.resync(&FixedSource(9)).await;
        assert_eq!(handle.open_count().await, 9);
        assert!(handle.snapshot().await.last_resync_at().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn resync_task_ticks_immediately_then_periodically() {
        let handle = CounterHandle::new();
        let task = ResyncTask::spawn(
            handle.clone(),
            Arc::new(FixedSource(3)),
            Duration::from_secs(5),
        );

        // First tick is the on-connect fetch.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(handle.open_count().await, 3);

        // Drift the cache; the next tick corrects it.
        handle
            .apply_local(
                supportdesk_core::types::Status::Open,
                supportdesk_core::types::Status::Closed,
            )
            .await;
        assert_eq!(handle.open_count().await, 2);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(handle.open_count().await, 3);

        task.abort();
    }

    fn drifted_ticket() -> supportdesk_core::types::Ticket {
        supportdesk_core::types::Ticket {
            id: supportdesk_core::types::TicketId::new(),
            subject: "dup".to_string(),
            category: supportdesk_core::types::Category::Other,
            priority: supportdesk_core::types::Priority::Medium,
            status: supportdesk_core::types::Status::Open,
            requester: supportdesk_core::types::UserId::new(),
            order: supportdesk_core::types::OrderId::new(),
            messages: vec![],
            created_at: Utc::now(),
        }
    }
}
