//! Shared fixtures and builders for reservation unit tests.

use crate::reservation::{
    adapters::memory::{InMemoryReservationStore, InMemoryTableStore},
    domain::{
        BookingDetails, Capacity, PartySize, Reservation, ReservationStatus, RestaurantConfig,
        Table, TableId, TableNumber, UserId,
    },
    ports::{ReservationStore, TableStore},
    services::ReservationScheduler,
};
use chrono::{NaiveDate, NaiveTime};
use mockable::DefaultClock;
use std::sync::Arc;

/// Scheduler wired over the in-memory adapters, as used throughout the
/// unit tests.
pub type TestScheduler =
    ReservationScheduler<InMemoryReservationStore, InMemoryTableStore, DefaultClock>;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

/// Standard dinner-service configuration: 11:00-22:00, 120-minute
/// occupancy windows, caps of 3 per user and 50 per day.
pub fn dinner_config() -> RestaurantConfig {
    config_with_limits(3, 50)
}

pub fn config_with_limits(per_user: usize, per_day: usize) -> RestaurantConfig {
    RestaurantConfig::new(time(11, 0), time(22, 0), 120, per_user, per_day, 30)
        .expect("valid config")
}

pub fn scheduler_over(
    reservations: Arc<InMemoryReservationStore>,
    tables: Arc<InMemoryTableStore>,
    config: RestaurantConfig,
) -> TestScheduler {
    ReservationScheduler::new(reservations, tables, config, Arc::new(DefaultClock))
}

pub async fn seed_table(store: &InMemoryTableStore, number: &str, capacity: u32) -> Table {
    let table = Table::new(
        TableNumber::new(number).expect("valid table number"),
        Capacity::new(capacity).expect("valid capacity"),
        &DefaultClock,
    );
    store.insert(&table).await.expect("table insert");
    table
}

pub async fn seed_reservation(
    store: &InMemoryReservationStore,
    user: &str,
    table_id: TableId,
    on: NaiveDate,
    at: NaiveTime,
) -> Reservation {
    let reservation = Reservation::new(
        UserId::new(user).expect("valid user id"),
        BookingDetails {
            table_id,
            date: on,
            time: at,
            party_size: PartySize::new(2).expect("valid party size"),
            special_requests: None,
        },
        &DefaultClock,
    )
    .expect("valid reservation");
    store.insert(&reservation).await.expect("reservation insert");
    reservation
}

/// Seeds a reservation and confirms it.
pub async fn seed_confirmed(
    store: &InMemoryReservationStore,
    user: &str,
    table_id: TableId,
    on: NaiveDate,
    at: NaiveTime,
) -> Reservation {
    let mut reservation = seed_reservation(store, user, table_id, on, at).await;
    reservation
        .transition_to(ReservationStatus::Confirmed, &DefaultClock)
        .expect("pending -> confirmed");
    store.update(&reservation).await.expect("reservation update");
    reservation
}
