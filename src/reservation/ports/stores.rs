//! Store ports for table-catalog and reservation persistence.
//!
//! Query shapes are fixed and named; services never compose ad-hoc
//! predicates against a store.

use crate::reservation::domain::{
    Reservation, ReservationId, Table, TableId, TableNumber, UserId,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Table-catalog persistence contract.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Stores a new table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateTable`] when the identifier already
    /// exists or [`StoreError::DuplicateTableNumber`] when the label is
    /// already taken.
    async fn insert(&self, table: &Table) -> StoreResult<()>;

    /// Persists changes to an existing table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TableNotFound`] when the table does not exist
    /// or [`StoreError::DuplicateTableNumber`] when the new label collides
    /// with another table.
    async fn update(&self, table: &Table) -> StoreResult<()>;

    /// Finds a table by identifier, returning `None` when absent.
    async fn find_by_id(&self, id: TableId) -> StoreResult<Option<Table>>;

    /// Finds a table by its human-facing label, returning `None` when absent.
    async fn find_by_number(&self, number: &TableNumber) -> StoreResult<Option<Table>>;

    /// Returns all active tables, ordered by label.
    async fn list_active(&self) -> StoreResult<Vec<Table>>;

    /// Returns the whole catalog, ordered by label.
    async fn list_all(&self) -> StoreResult<Vec<Table>>;

    /// Removes a table from the catalog.
    ///
    /// Referential protection (no deletion while reservations reference the
    /// table) is enforced by the scheduler, not the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TableNotFound`] when the table does not exist.
    async fn delete(&self, id: TableId) -> StoreResult<()>;
}

/// Reservation persistence contract.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Stores a new reservation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateReservation`] when the identifier
    /// already exists.
    async fn insert(&self, reservation: &Reservation) -> StoreResult<()>;

    /// Persists changes to an existing reservation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ReservationNotFound`] when the reservation does
    /// not exist.
    async fn update(&self, reservation: &Reservation) -> StoreResult<()>;

    /// Finds a reservation by identifier, returning `None` when absent.
    async fn find_by_id(&self, id: ReservationId) -> StoreResult<Option<Reservation>>;

    /// Returns all reservations on one table for one day, ordered by time.
    ///
    /// Includes every status; callers filter for active occupancy.
    async fn query_by_table_and_date(
        &self,
        table_id: TableId,
        date: NaiveDate,
    ) -> StoreResult<Vec<Reservation>>;

    /// Returns one user's active (pending or confirmed) reservations across
    /// all dates.
    async fn query_active_by_user(&self, user_id: &UserId) -> StoreResult<Vec<Reservation>>;

    /// Returns all active (pending or confirmed) reservations on one day.
    async fn query_active_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Reservation>>;

    /// Returns one user's reservations in every status, ordered by date then
    /// time.
    async fn query_by_user(&self, user_id: &UserId) -> StoreResult<Vec<Reservation>>;

    /// Returns true when any reservation, in any status, references the
    /// table.
    async fn exists_for_table(&self, table_id: TableId) -> StoreResult<bool>;
}

/// Errors returned by store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A table with the same identifier already exists.
    #[error("duplicate table identifier: {0}")]
    DuplicateTable(TableId),

    /// A table with the same label already exists.
    #[error("duplicate table number: {0}")]
    DuplicateTableNumber(TableNumber),

    /// A reservation with the same identifier already exists.
    #[error("duplicate reservation identifier: {0}")]
    DuplicateReservation(ReservationId),

    /// The table was not found.
    #[error("table not found: {0}")]
    TableNotFound(TableId),

    /// The reservation was not found.
    #[error("reservation not found: {0}")]
    ReservationNotFound(ReservationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
