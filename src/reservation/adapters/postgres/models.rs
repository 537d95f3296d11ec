//! Diesel row models and domain conversions for reservation persistence.

use super::schema::{dining_tables, reservations};
use crate::reservation::{
    domain::{
        BookingDetails, Capacity, PartySize, PersistedReservationData, PersistedTableData,
        Reservation, ReservationId, ReservationStatus, Table, TableId, TableNumber, UserId,
    },
    ports::{StoreError, StoreResult},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;

/// Query result row for dining tables.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = dining_tables)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TableRow {
    /// Table identifier.
    pub id: uuid::Uuid,
    /// Human-facing label.
    pub table_number: String,
    /// Seat count.
    pub capacity: i32,
    /// Active flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for dining tables.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = dining_tables)]
pub struct NewTableRow {
    /// Table identifier.
    pub id: uuid::Uuid,
    /// Human-facing label.
    pub table_number: String,
    /// Seat count.
    pub capacity: i32,
    /// Active flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for reservations.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReservationRow {
    /// Reservation identifier.
    pub id: uuid::Uuid,
    /// Owning user identifier.
    pub user_id: String,
    /// Booked table identifier.
    pub table_id: uuid::Uuid,
    /// Calendar day of the visit.
    pub reservation_date: NaiveDate,
    /// Start of the occupancy window.
    pub reservation_time: NaiveTime,
    /// Guest count.
    pub party_size: i32,
    /// Optional free-text note.
    pub special_requests: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for reservations.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = reservations)]
pub struct NewReservationRow {
    /// Reservation identifier.
    pub id: uuid::Uuid,
    /// Owning user identifier.
    pub user_id: String,
    /// Booked table identifier.
    pub table_id: uuid::Uuid,
    /// Calendar day of the visit.
    pub reservation_date: NaiveDate,
    /// Start of the occupancy window.
    pub reservation_time: NaiveTime,
    /// Guest count.
    pub party_size: i32,
    /// Optional free-text note.
    pub special_requests: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Maps a table aggregate to its insert/changeset row.
pub fn table_to_row(table: &Table) -> StoreResult<NewTableRow> {
    let capacity =
        i32::try_from(table.capacity().value()).map_err(StoreError::persistence)?;
    Ok(NewTableRow {
        id: table.id().into_inner(),
        table_number: table.number().as_str().to_owned(),
        capacity,
        active: table.is_active(),
        created_at: table.created_at(),
        updated_at: table.updated_at(),
    })
}

/// Reconstructs a table aggregate from its row.
pub fn row_to_table(row: TableRow) -> StoreResult<Table> {
    let capacity_value = u32::try_from(row.capacity).map_err(StoreError::persistence)?;
    let data = PersistedTableData {
        id: TableId::from_uuid(row.id),
        number: TableNumber::new(row.table_number).map_err(StoreError::persistence)?,
        capacity: Capacity::new(capacity_value).map_err(StoreError::persistence)?,
        active: row.active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(Table::from_persisted(data))
}

/// Maps a reservation aggregate to its insert/changeset row.
pub fn reservation_to_row(reservation: &Reservation) -> StoreResult<NewReservationRow> {
    let party_size =
        i32::try_from(reservation.party_size().value()).map_err(StoreError::persistence)?;
    Ok(NewReservationRow {
        id: reservation.id().into_inner(),
        user_id: reservation.user_id().as_str().to_owned(),
        table_id: reservation.table_id().into_inner(),
        reservation_date: reservation.date(),
        reservation_time: reservation.time(),
        party_size,
        special_requests: reservation.special_requests().map(ToOwned::to_owned),
        status: reservation.status().as_str().to_owned(),
        created_at: reservation.created_at(),
        updated_at: reservation.updated_at(),
    })
}

/// Reconstructs a reservation aggregate from its row.
pub fn row_to_reservation(row: ReservationRow) -> StoreResult<Reservation> {
    let party_value = u32::try_from(row.party_size).map_err(StoreError::persistence)?;
    let status =
        ReservationStatus::try_from(row.status.as_str()).map_err(StoreError::persistence)?;
    let data = PersistedReservationData {
        id: ReservationId::from_uuid(row.id),
        user_id: UserId::new(row.user_id).map_err(StoreError::persistence)?,
        details: BookingDetails {
            table_id: TableId::from_uuid(row.table_id),
            date: row.reservation_date,
            time: row.reservation_time,
            party_size: PartySize::new(party_value).map_err(StoreError::persistence)?,
            special_requests: row.special_requests,
        },
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(Reservation::from_persisted(data))
}
