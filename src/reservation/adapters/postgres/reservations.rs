//! `PostgreSQL` reservation store.

use super::{
    models::{ReservationRow, reservation_to_row, row_to_reservation},
    schema::reservations,
    ReservationPgPool,
};
use crate::reservation::{
    domain::{Reservation, ReservationId, TableId, UserId},
    ports::{ReservationStore, StoreError, StoreResult},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Statuses that occupy a table and count toward booking limits.
const ACTIVE_STATUSES: [&str; 2] = ["pending", "confirmed"];

/// `PostgreSQL`-backed reservation store.
#[derive(Debug, Clone)]
pub struct PostgresReservationStore {
    pool: ReservationPgPool,
}

impl PostgresReservationStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ReservationPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(StoreError::persistence)?
    }
}

#[async_trait]
impl ReservationStore for PostgresReservationStore {
    async fn insert(&self, reservation: &Reservation) -> StoreResult<()> {
        let reservation_id = reservation.id();
        let new_row = reservation_to_row(reservation)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(reservations::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        StoreError::DuplicateReservation(reservation_id)
                    }
                    _ => StoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, reservation: &Reservation) -> StoreResult<()> {
        let reservation_id = reservation.id();
        let row = reservation_to_row(reservation)?;

        self.run_blocking(move |connection| {
            let affected = diesel::update(reservations::table.find(reservation_id.into_inner()))
                .set(&row)
                .execute(connection)
                .map_err(StoreError::persistence)?;
            if affected == 0 {
                return Err(StoreError::ReservationNotFound(reservation_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: ReservationId) -> StoreResult<Option<Reservation>> {
        self.run_blocking(move |connection| {
            let row = reservations::table
                .find(id.into_inner())
                .select(ReservationRow::as_select())
                .first::<ReservationRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_reservation).transpose()
        })
        .await
    }

    async fn query_by_table_and_date(
        &self,
        table_id: TableId,
        date: NaiveDate,
    ) -> StoreResult<Vec<Reservation>> {
        self.run_blocking(move |connection| {
            let rows = reservations::table
                .filter(reservations::table_id.eq(table_id.into_inner()))
                .filter(reservations::reservation_date.eq(date))
                .order(reservations::reservation_time.asc())
                .select(ReservationRow::as_select())
                .load::<ReservationRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(row_to_reservation).collect()
        })
        .await
    }

    async fn query_active_by_user(&self, user_id: &UserId) -> StoreResult<Vec<Reservation>> {
        let owner = user_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = reservations::table
                .filter(reservations::user_id.eq(owner))
                .filter(reservations::status.eq_any(ACTIVE_STATUSES))
                .order((
                    reservations::reservation_date.asc(),
                    reservations::reservation_time.asc(),
                ))
                .select(ReservationRow::as_select())
                .load::<ReservationRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(row_to_reservation).collect()
        })
        .await
    }

    async fn query_active_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Reservation>> {
        self.run_blocking(move |connection| {
            let rows = reservations::table
                .filter(reservations::reservation_date.eq(date))
                .filter(reservations::status.eq_any(ACTIVE_STATUSES))
                .order(reservations::reservation_time.asc())
                .select(ReservationRow::as_select())
                .load::<ReservationRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(row_to_reservation).collect()
        })
        .await
    }

    async fn query_by_user(&self, user_id: &UserId) -> StoreResult<Vec<Reservation>> {
        let owner = user_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = reservations::table
                .filter(reservations::user_id.eq(owner))
                .order((
                    reservations::reservation_date.asc(),
                    reservations::reservation_time.asc(),
                ))
                .select(ReservationRow::as_select())
                .load::<ReservationRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(row_to_reservation).collect()
        })
        .await
    }

    async fn exists_for_table(&self, table_id: TableId) -> StoreResult<bool> {
        self.run_blocking(move |connection| {
            diesel::select(diesel::dsl::exists(
                reservations::table.filter(reservations::table_id.eq(table_id.into_inner())),
            ))
            .get_result::<bool>(connection)
            .map_err(StoreError::persistence)
        })
        .await
    }
}
