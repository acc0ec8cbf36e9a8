//! Counter reconciliation against a live store and bus: incremental
//! deltas for latency, resync for truth.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use std::sync::Arc;
use supportdesk_client::{CounterHandle, OpenCountSource};
use supportdesk_core::types::Status;
use supportdesk_core::TicketStore;
use supportdesk_realtime::{Room, RoomBus};
use supportdesk_testing::fixtures::cold_order_complaint;
use supportdesk_testing::test_clock;

fn wired() -> (Arc<TicketStore>, RoomBus) {
    let bus = RoomBus::new();
    let store = Arc::new(TicketStore::new(
        Arc::new(test_clock()),
        Arc::new(bus.clone()),
    ));
    (store, bus)
}

#[tokio::test]
async fn badge_tracks_the_full_lifecycle_through_the_bus() {
    let (store, bus) = wired();

    // Seed N open tickets, then connect.
    for _ in 0..3 {
        store.create_ticket(cold_order_complaint()).await.unwrap();
    }
    let mut global_rx = bus.subscribe(Room::Global).await;
    let counter = CounterHandle::new();
    counter.resync(store.as_ref()).await;
    assert_eq!(counter.open_count().await, 3);

    // create → N+1
    let t1 = store.create_ticket(cold_order_complaint()).await.unwrap();
    counter.observe(&global_rx.recv().await.unwrap()).await;
    assert_eq!(counter.open_count().await, 4);

    // in_progress → unchanged
    store
        .set_status(t1.id, Status::InProgress, None)
        .await
        .unwrap();
    counter.observe(&global_rx.recv().await.unwrap()).await;
    assert_eq!(counter.open_count().await, 4);

    // resolved → N
    store.set_status(t1.id, Status::Resolved, None).await.unwrap();
    counter.observe(&global_rx.recv().await.unwrap()).await;
    assert_eq!(counter.open_count().await, 3);

    // reopen → N+1
    store.set_status(t1.id, Status::Open, None).await.unwrap();
    counter.observe(&global_rx.recv().await.unwrap()).await;
    assert_eq!(counter.open_count().await, 4);
}

#[tokio::test]
async fn missed_events_converge_after_one_resync() {
    let (store, _bus) = wired();
    let counter = CounterHandle::new();
    counter.resync(store.as_ref()).await;
    assert_eq!(counter.open_count().await, 0);

    // The client is "disconnected": mutations happen without any
    // events being observed.
    let a = store.create_ticket(cold_order_complaint()).await.unwrap();
    let b = store.create_ticket(cold_order_complaint()).await.unwrap();
    store.create_ticket(cold_order_complaint()).await.unwrap();
    store.set_status(a.id, Status::Closed, None).await.unwrap();
    store.set_status(b.id, Status::Resolved, None).await.unwrap();

    // Cache is stale, not wrong forever: one resync restores truth.
    assert_eq!(counter.open_count().await, 0);
    counter.resync(store.as_ref()).await;
    assert_eq!(counter.open_count().await, 1);

    // Idempotent: resyncing again changes nothing.
    counter.resync(store.as_ref()).await;
    assert_eq!(counter.open_count().await, 1);
}

#[tokio::test]
async fn optimistic_local_update_is_reconciled_not_trusted() {
    let (store, _bus) = wired();
    let ticket = store.create_ticket(cold_order_complaint()).await.unwrap();
    let counter = CounterHandle::new();
    counter.resync(store.as_ref()).await;
    assert_eq!(counter.open_count().await, 1);

    // The acting client applies the delta before the round trip...
    counter.apply_local(Status::Open, Status::Resolved).await;
    assert_eq!(counter.open_count().await, 0);

    // ...but the server-side mutation failed to commit (simulated by
    // not performing it). The next resync corrects the lie.
    counter.resync(store.as_ref()).await;
    assert_eq!(counter.open_count().await, 1);

    // When the mutation does commit, resync and optimism agree.
    store
        .set_status(ticket.id, Status::Resolved, None)
        .await
        .unwrap();
    counter.apply_local(Status::Open, Status::Resolved).await;
    counter.resync(store.as_ref()).await;
    assert_eq!(counter.open_count().await, 0);
}

#[tokio::test]
async fn store_truth_is_independent_of_client_caches() {
    let (store, _bus) = wired();
    let counter = CounterHandle::new();

    // Wreck the cache with garbage optimism.
    for _ in 0..5 {
        counter.apply_local(Status::Closed, Status::Open).await;
    }
    assert_eq!(counter.open_count().await, 5);

    // An admin listing derives its count purely from stored tickets.
    let open = store.list(Some(Status::Open)).await;
    assert_eq!(open.len(), 0);
    assert_eq!(store.fetch_open_count().await, 0);
}
