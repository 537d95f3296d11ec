//! Behavioural tests for concurrent booking contention.
//!
//! Racing bookings for one table are serialized by the scheduler's
//! per-table lock: exactly one wins the slot, lock waits are bounded, and a
//! timed-out caller retries the whole operation through the facade.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Tasks rebind shared handles when moving them into spawned futures"
)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use maitre::reservation::{
    adapters::memory::{InMemoryReservationStore, InMemoryTableStore},
    domain::{
        Capacity, Reservation, ReservationId, ReservationStatus, RestaurantConfig, Table,
        TableId, TableNumber, UserId,
    },
    ports::{ReservationStore, StoreResult, TableStore},
    services::{
        ConflictReason, CreateReservationRequest, ReservationScheduler, SchedulerError,
        UpdateReservationRequest,
    },
};
use mockable::DefaultClock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

fn busy_config() -> RestaurantConfig {
    // Limits sized so caps never mask slot contention.
    RestaurantConfig::new(time(11, 0), time(22, 0), 120, 100, 1000, 30)
        .expect("valid config")
}

async fn seed_table(store: &InMemoryTableStore) -> Table {
    let table = Table::new(
        TableNumber::new("T1").expect("valid table number"),
        Capacity::new(4).expect("valid capacity"),
        &DefaultClock,
    );
    store.insert(&table).await.expect("table insert");
    table
}

/// Reservation store that stalls overlap queries, widening the window in
/// which a second booking would observe stale availability.
struct SlowReservationStore {
    inner: InMemoryReservationStore,
    query_delay: Duration,
}

impl SlowReservationStore {
    fn new(query_delay: Duration) -> Self {
        Self {
            inner: InMemoryReservationStore::new(),
            query_delay,
        }
    }
}

#[async_trait]
impl ReservationStore for SlowReservationStore {
    async fn insert(&self, reservation: &Reservation) -> StoreResult<()> {
        self.inner.insert(reservation).await
    }

    async fn update(&self, reservation: &Reservation) -> StoreResult<()> {
        self.inner.update(reservation).await
    }

    async fn find_by_id(&self, id: ReservationId) -> StoreResult<Option<Reservation>> {
        self.inner.find_by_id(id).await
    }

    async fn query_by_table_and_date(
        &self,
        table_id: TableId,
        date: NaiveDate,
    ) -> StoreResult<Vec<Reservation>> {
        tokio::time::sleep(self.query_delay).await;
        self.inner.query_by_table_and_date(table_id, date).await
    }

    async fn query_active_by_user(&self, user_id: &UserId) -> StoreResult<Vec<Reservation>> {
        self.inner.query_active_by_user(user_id).await
    }

    async fn query_active_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Reservation>> {
        self.inner.query_active_by_date(date).await
    }

    async fn query_by_user(&self, user_id: &UserId) -> StoreResult<Vec<Reservation>> {
        self.inner.query_by_user(user_id).await
    }

    async fn exists_for_table(&self, table_id: TableId) -> StoreResult<bool> {
        self.inner.exists_for_table(table_id).await
    }
}

/// Reservation store whose first identifier lookup returns a stale
/// snapshot, stretching the gap between a status transition's initial read
/// and its commit.
struct StaleReadStore {
    inner: InMemoryReservationStore,
    first_read_delay: Duration,
    delayed: AtomicBool,
}

impl StaleReadStore {
    fn new(first_read_delay: Duration) -> Self {
        Self {
            inner: InMemoryReservationStore::new(),
            first_read_delay,
            delayed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ReservationStore for StaleReadStore {
    async fn insert(&self, reservation: &Reservation) -> StoreResult<()> {
        self.inner.insert(reservation).await
    }

    async fn update(&self, reservation: &Reservation) -> StoreResult<()> {
        self.inner.update(reservation).await
    }

    async fn find_by_id(&self, id: ReservationId) -> StoreResult<Option<Reservation>> {
        let found = self.inner.find_by_id(id).await;
        if !self.delayed.swap(true, Ordering::SeqCst) {
            tokio::time::sleep(self.first_read_delay).await;
        }
        found
    }

    async fn query_by_table_and_date(
        &self,
        table_id: TableId,
        date: NaiveDate,
    ) -> StoreResult<Vec<Reservation>> {
        self.inner.query_by_table_and_date(table_id, date).await
    }

    async fn query_active_by_user(&self, user_id: &UserId) -> StoreResult<Vec<Reservation>> {
        self.inner.query_active_by_user(user_id).await
    }

    async fn query_active_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Reservation>> {
        self.inner.query_active_by_date(date).await
    }

    async fn query_by_user(&self, user_id: &UserId) -> StoreResult<Vec<Reservation>> {
        self.inner.query_by_user(user_id).await
    }

    async fn exists_for_table(&self, table_id: TableId) -> StoreResult<bool> {
        self.inner.exists_for_table(table_id).await
    }
}

/// Eight racing bookings for one slot: exactly one wins, the rest observe a
/// typed slot conflict.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_bookings_admit_exactly_one() {
    let reservations = Arc::new(InMemoryReservationStore::new());
    let tables = Arc::new(InMemoryTableStore::new());
    let table = seed_table(&tables).await;
    let scheduler = Arc::new(ReservationScheduler::new(
        Arc::clone(&reservations),
        Arc::clone(&tables),
        busy_config(),
        Arc::new(DefaultClock),
    ));

    let mut handles = Vec::new();
    for guest in 0..8 {
        let scheduler = Arc::clone(&scheduler);
        let table_id = table.id();
        handles.push(tokio::spawn(async move {
            scheduler
                .create(CreateReservationRequest::new(
                    format!("guest-{guest}"),
                    table_id,
                    date(2024, 7, 12),
                    time(19, 0),
                    2,
                ))
                .await
        }));
    }

    let mut winners = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.expect("booking task panicked") {
            Ok(_) => winners += 1,
            Err(SchedulerError::Conflict(ConflictReason::SlotUnavailable { .. })) => {
                conflicts += 1;
            }
            Err(other) => panic!("unexpected booking outcome: {other:?}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(conflicts, 7);

    let booked = reservations
        .query_by_table_and_date(table.id(), date(2024, 7, 12))
        .await
        .expect("calendar query");
    assert_eq!(booked.len(), 1);
}

/// Back-to-back windows never contend: concurrent bookings for adjacent
/// slots on one table all succeed.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn adjacent_slots_book_concurrently() {
    let reservations = Arc::new(InMemoryReservationStore::new());
    let tables = Arc::new(InMemoryTableStore::new());
    let table = seed_table(&tables).await;
    let scheduler = Arc::new(ReservationScheduler::new(
        reservations,
        tables,
        busy_config(),
        Arc::new(DefaultClock),
    ));

    let mut handles = Vec::new();
    for (guest, hour) in [11, 13, 15, 17, 19].into_iter().enumerate() {
        let scheduler = Arc::clone(&scheduler);
        let table_id = table.id();
        handles.push(tokio::spawn(async move {
            scheduler
                .create(CreateReservationRequest::new(
                    format!("guest-{guest}"),
                    table_id,
                    date(2024, 7, 12),
                    time(hour, 0),
                    2,
                ))
                .await
        }));
    }

    for handle in handles {
        handle
            .await
            .expect("booking task panicked")
            .expect("adjacent slot booking");
    }
}

/// A booking that cannot obtain the table lock in time fails with a
/// retryable conflict; the retry re-runs the full validation chain and
/// observes the winner's reservation.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn lock_timeout_is_retryable() {
    let reservations = Arc::new(SlowReservationStore::new(Duration::from_millis(500)));
    let tables = Arc::new(InMemoryTableStore::new());
    let table = seed_table(&tables).await;
    let scheduler = Arc::new(
        ReservationScheduler::new(
            reservations,
            tables,
            busy_config(),
            Arc::new(DefaultClock),
        )
        .with_lock_timeout(Duration::from_millis(20)),
    );

    let winner = {
        let scheduler = Arc::clone(&scheduler);
        let table_id = table.id();
        tokio::spawn(async move {
            scheduler
                .create(CreateReservationRequest::new(
                    "guest-1",
                    table_id,
                    date(2024, 7, 12),
                    time(19, 0),
                    2,
                ))
                .await
        })
    };

    // Give the winner time to take the table lock and stall in the overlap
    // query.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let request =
        CreateReservationRequest::new("guest-2", table.id(), date(2024, 7, 12), time(19, 0), 2);
    let timed_out = scheduler.create(request.clone()).await;
    assert!(matches!(
        timed_out,
        Err(SchedulerError::RetryableConflict(id)) if id == table.id()
    ));

    winner
        .await
        .expect("winning task panicked")
        .expect("winning booking");

    // The retry goes through the whole chain again and now sees the slot
    // taken.
    let retried = scheduler.create(request).await;
    assert!(matches!(
        retried,
        Err(SchedulerError::Conflict(ConflictReason::SlotUnavailable { .. }))
    ));
}

/// A confirmation that read its reservation before a concurrent move
/// commits the moved placement, not the stale one it first saw: the
/// vacated window stays with the guest who rebooked it.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn late_confirmation_does_not_resurrect_a_moved_booking() {
    let reservations = Arc::new(StaleReadStore::new(Duration::from_millis(400)));
    let tables = Arc::new(InMemoryTableStore::new());
    let table = seed_table(&tables).await;
    let scheduler = Arc::new(ReservationScheduler::new(
        Arc::clone(&reservations),
        Arc::clone(&tables),
        busy_config(),
        Arc::new(DefaultClock),
    ));
    let evening = date(2024, 7, 12);

    let reservation = scheduler
        .create(CreateReservationRequest::new(
            "guest-1",
            table.id(),
            evening,
            time(18, 0),
            2,
        ))
        .await
        .expect("initial booking");

    // The confirmation takes its first read now; the store holds that
    // stale snapshot for 400ms.
    let confirmation = {
        let scheduler = Arc::clone(&scheduler);
        let id = reservation.id();
        tokio::spawn(async move {
            scheduler
                .change_status(id, ReservationStatus::Confirmed)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    // While the confirmation is stalled, the owner moves the booking and
    // another guest takes the vacated window.
    scheduler
        .update(UpdateReservationRequest::new(
            reservation.id(),
            "guest-1",
            table.id(),
            evening,
            time(12, 0),
            2,
        ))
        .await
        .expect("move booking to lunch");
    scheduler
        .create(CreateReservationRequest::new(
            "guest-2",
            table.id(),
            evening,
            time(18, 0),
            2,
        ))
        .await
        .expect("rebook vacated window");

    let confirmed = confirmation
        .await
        .expect("confirmation task panicked")
        .expect("confirmation");
    assert_eq!(confirmed.status(), ReservationStatus::Confirmed);
    assert_eq!(confirmed.time(), time(12, 0));

    let calendar = reservations
        .query_by_table_and_date(table.id(), evening)
        .await
        .expect("calendar query");
    let active_at_dinner: Vec<_> = calendar
        .iter()
        .filter(|r| r.is_active() && r.time() == time(18, 0))
        .collect();
    assert_eq!(active_at_dinner.len(), 1);
    assert_eq!(
        active_at_dinner.first().map(|r| r.user_id().as_str()),
        Some("guest-2")
    );
}
