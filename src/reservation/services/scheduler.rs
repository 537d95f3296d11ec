//! Scheduler facade orchestrating bookings, the catalog, and availability.

use crate::reservation::{
    domain::{
        BookingDetails, Capacity, PartySize, Reservation, ReservationDomainError, ReservationId,
        ReservationStatus, RestaurantConfig, Table, TableId, TableNumber, UserId,
    },
    ports::{ReservationStore, StoreError, TableStore},
    services::{AvailabilityEngine, DaySchedule, LimitPolicy},
};
use chrono::{NaiveDate, NaiveTime};
use dashmap::DashMap;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

/// How long a booking waits for its table lock before giving up.
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Guards held while mutating a reservation: its current table's lock,
/// plus the target table's when an update moves it.
type TableLockGuards = (OwnedMutexGuard<()>, Option<OwnedMutexGuard<()>>);

/// Business-rule conflicts that reject an otherwise well-formed request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConflictReason {
    /// Another active reservation occupies the requested window.
    #[error("table {table_id} is not available on {date} at {time}")]
    SlotUnavailable {
        /// Requested table.
        table_id: TableId,
        /// Requested day.
        date: NaiveDate,
        /// Requested window start.
        time: NaiveTime,
    },

    /// The user already holds the maximum number of active reservations.
    #[error("user {0} has reached the active reservation limit")]
    UserLimitReached(UserId),

    /// The day already holds the maximum number of active reservations.
    #[error("no reservation capacity left on {0}")]
    DayLimitReached(NaiveDate),

    /// The requested table label is already in use.
    #[error("table number {0} already exists")]
    TableNumberTaken(TableNumber),

    /// Reservations still reference the table.
    #[error("table {0} has reservations and cannot be deleted")]
    TableHasReservations(TableId),
}

/// Entity a lookup failed to resolve.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MissingEntity {
    /// No table with the given identifier.
    #[error("table {0}")]
    Table(TableId),

    /// No reservation with the given identifier.
    #[error("reservation {0}")]
    Reservation(ReservationId),
}

/// Errors returned by scheduler operations.
///
/// Business outcomes are typed values: a taken slot or an exceeded limit is
/// a [`SchedulerError::Conflict`], never a panic. Only
/// [`SchedulerError::RetryableConflict`] invites an automatic retry; every
/// other kind is terminal for the call.
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    /// Request-level validation failed; nothing was checked against stores.
    #[error("validation failed: {0}")]
    Validation(ReservationDomainError),

    /// A business rule rejected the request.
    #[error("booking conflict: {0}")]
    Conflict(ConflictReason),

    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(MissingEntity),

    /// The caller does not own the reservation it is mutating.
    #[error("user {caller} may not modify reservation {reservation_id}")]
    Authorization {
        /// Reservation being mutated.
        reservation_id: ReservationId,
        /// User attempting the mutation.
        caller: UserId,
    },

    /// The requested status move is not an edge of the lifecycle table.
    #[error("invalid status transition for reservation {reservation_id}: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Reservation being transitioned.
        reservation_id: ReservationId,
        /// Current status.
        from: ReservationStatus,
        /// Requested status.
        to: ReservationStatus,
    },

    /// Concurrent booking contention; the caller may retry the whole
    /// operation.
    #[error("concurrent booking contention on table {0}, retry the operation")]
    RetryableConflict(TableId),

    /// Infrastructure failure in a backing store.
    #[error("store failure: {0}")]
    Store(StoreError),
}

impl From<ReservationDomainError> for SchedulerError {
    fn from(err: ReservationDomainError) -> Self {
        match err {
            ReservationDomainError::InvalidStatusTransition {
                reservation_id,
                from,
                to,
            } => Self::InvalidTransition {
                reservation_id,
                from,
                to,
            },
            other => Self::Validation(other),
        }
    }
}

impl From<StoreError> for SchedulerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TableNotFound(id) => Self::NotFound(MissingEntity::Table(id)),
            StoreError::ReservationNotFound(id) => {
                Self::NotFound(MissingEntity::Reservation(id))
            }
            other => Self::Store(other),
        }
    }
}

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Request payload for creating a reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReservationRequest {
    user_id: String,
    table_id: TableId,
    date: NaiveDate,
    time: NaiveTime,
    party_size: u32,
    special_requests: Option<String>,
}

impl CreateReservationRequest {
    /// Creates a request with the required booking fields.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        table_id: TableId,
        date: NaiveDate,
        time: NaiveTime,
        party_size: u32,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            table_id,
            date,
            time,
            party_size,
            special_requests: None,
        }
    }

    /// Attaches a special-requests note.
    #[must_use]
    pub fn with_special_requests(mut self, note: impl Into<String>) -> Self {
        self.special_requests = Some(note.into());
        self
    }
}

/// Request payload for updating an existing reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReservationRequest {
    reservation_id: ReservationId,
    caller_user_id: String,
    table_id: TableId,
    date: NaiveDate,
    time: NaiveTime,
    party_size: u32,
    special_requests: Option<String>,
}

impl UpdateReservationRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        reservation_id: ReservationId,
        caller_user_id: impl Into<String>,
        table_id: TableId,
        date: NaiveDate,
        time: NaiveTime,
        party_size: u32,
    ) -> Self {
        Self {
            reservation_id,
            caller_user_id: caller_user_id.into(),
            table_id,
            date,
            time,
            party_size,
            special_requests: None,
        }
    }

    /// Attaches a special-requests note.
    #[must_use]
    pub fn with_special_requests(mut self, note: impl Into<String>) -> Self {
        self.special_requests = Some(note.into());
        self
    }
}

/// Facade over limits, availability, the catalog, and the booking
/// lifecycle; the only component exposed to callers.
///
/// Shared behind `Arc` across concurrent callers. The check-then-write
/// sequence in [`create`](Self::create) and [`update`](Self::update) is
/// serialized per table through an exclusive async lock held for the whole
/// validation-and-insert span, so two racing bookings for one table cannot
/// both pass the availability check. Status transitions take the same lock
/// and re-read the reservation under it, so a late confirmation cannot
/// write back a placement a concurrent update has replaced. Lock
/// acquisition is bounded; on timeout the operation fails with
/// [`SchedulerError::RetryableConflict`] rather than deadlocking, and a
/// retrying caller re-runs the full validation chain by re-entering the
/// facade.
pub struct ReservationScheduler<R, T, C>
where
    R: ReservationStore,
    T: TableStore,
    C: Clock + Send + Sync,
{
    reservations: Arc<R>,
    tables: Arc<T>,
    clock: Arc<C>,
    availability: AvailabilityEngine<R, T>,
    limits: LimitPolicy<R>,
    table_locks: DashMap<TableId, Arc<Mutex<()>>>,
    lock_timeout: Duration,
}

impl<R, T, C> ReservationScheduler<R, T, C>
where
    R: ReservationStore,
    T: TableStore,
    C: Clock + Send + Sync,
{
    /// Creates a new scheduler over the given stores and configuration.
    #[must_use]
    pub fn new(
        reservations: Arc<R>,
        tables: Arc<T>,
        config: RestaurantConfig,
        clock: Arc<C>,
    ) -> Self {
        let availability = AvailabilityEngine::new(
            Arc::clone(&reservations),
            Arc::clone(&tables),
            config.clone(),
        );
        let limits = LimitPolicy::new(Arc::clone(&reservations), config);
        Self {
            reservations,
            tables,
            clock,
            availability,
            limits,
            table_locks: DashMap::new(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Overrides the bound on table-lock acquisition.
    #[must_use]
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Books a table.
    ///
    /// Preconditions run in order under the table lock: user and day limits,
    /// table existence/activity/capacity, then window availability. Any
    /// failure returns a typed error and mutates nothing; on success the
    /// reservation is persisted with status `Pending`.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Validation`], [`SchedulerError::Conflict`],
    /// [`SchedulerError::NotFound`], [`SchedulerError::RetryableConflict`],
    /// or [`SchedulerError::Store`].
    pub async fn create(&self, request: CreateReservationRequest) -> SchedulerResult<Reservation> {
        let user_id = UserId::new(request.user_id)?;
        let party_size = PartySize::new(request.party_size)?;

        let _guard = self.lock_table(request.table_id).await?;

        if !self.limits.can_user_book(&user_id).await? {
            return Err(SchedulerError::Conflict(ConflictReason::UserLimitReached(
                user_id,
            )));
        }
        if !self.limits.can_day_accept(request.date).await? {
            return Err(SchedulerError::Conflict(ConflictReason::DayLimitReached(
                request.date,
            )));
        }

        let table = self.require_table(request.table_id).await?;
        table.check_bookable(party_size)?;

        let free = self
            .availability
            .is_table_free(request.table_id, request.date, request.time, None)
            .await?;
        if !free {
            return Err(SchedulerError::Conflict(ConflictReason::SlotUnavailable {
                table_id: request.table_id,
                date: request.date,
                time: request.time,
            }));
        }

        let details = BookingDetails {
            table_id: request.table_id,
            date: request.date,
            time: request.time,
            party_size,
            special_requests: request.special_requests,
        };
        let reservation = Reservation::new(user_id, details, &*self.clock)?;
        self.reservations.insert(&reservation).await?;
        info!(
            reservation_id = %reservation.id(),
            table_id = %reservation.table_id(),
            date = %reservation.date(),
            "reservation created"
        );
        Ok(reservation)
    }

    /// Moves or resizes an existing reservation.
    ///
    /// Owner-only. Capacity and table bookability are always re-validated;
    /// the availability check re-runs, excluding the reservation's own
    /// window, whenever the table, date, or time changed. Limits are not
    /// re-checked, as the user already holds this slot.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Authorization`] for non-owners, plus the same kinds
    /// as [`create`](Self::create).
    pub async fn update(&self, request: UpdateReservationRequest) -> SchedulerResult<Reservation> {
        let caller = UserId::new(request.caller_user_id)?;
        let party_size = PartySize::new(request.party_size)?;

        let (_guards, mut reservation) = self
            .lock_reservation(request.reservation_id, Some(request.table_id))
            .await?;
        if reservation.user_id() != &caller {
            return Err(SchedulerError::Authorization {
                reservation_id: reservation.id(),
                caller,
            });
        }

        let table = self.require_table(request.table_id).await?;
        table.check_bookable(party_size)?;

        let placement_changed = reservation.table_id() != request.table_id
            || reservation.date() != request.date
            || reservation.time() != request.time;
        if placement_changed {
            let free = self
                .availability
                .is_table_free(
                    request.table_id,
                    request.date,
                    request.time,
                    Some(reservation.id()),
                )
                .await?;
            if !free {
                return Err(SchedulerError::Conflict(ConflictReason::SlotUnavailable {
                    table_id: request.table_id,
                    date: request.date,
                    time: request.time,
                }));
            }
        }

        let details = BookingDetails {
            table_id: request.table_id,
            date: request.date,
            time: request.time,
            party_size,
            special_requests: request.special_requests,
        };
        reservation.reschedule(details, &*self.clock)?;
        self.reservations.update(&reservation).await?;
        info!(reservation_id = %reservation.id(), "reservation updated");
        Ok(reservation)
    }

    /// Advances a reservation along the status lifecycle.
    ///
    /// Delegates purely to the domain transition table; caller-role checks
    /// are an external collaborator concern. The reservation is re-read
    /// under its table lock so the transition never writes back a placement
    /// a concurrent [`update`](Self::update) has already replaced.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::InvalidTransition`] for moves outside the table,
    /// [`SchedulerError::NotFound`], [`SchedulerError::RetryableConflict`],
    /// or [`SchedulerError::Store`].
    pub async fn change_status(
        &self,
        reservation_id: ReservationId,
        new_status: ReservationStatus,
    ) -> SchedulerResult<Reservation> {
        let (_guards, mut reservation) = self.lock_reservation(reservation_id, None).await?;
        reservation.transition_to(new_status, &*self.clock)?;
        self.reservations.update(&reservation).await?;
        info!(%reservation_id, status = new_status.as_str(), "reservation status changed");
        Ok(reservation)
    }

    /// Cancels a reservation on behalf of its owner.
    ///
    /// Equivalent to a transition to `Cancelled` with an additional
    /// ownership check.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Authorization`] for non-owners,
    /// [`SchedulerError::InvalidTransition`] when the reservation is already
    /// terminal, [`SchedulerError::NotFound`],
    /// [`SchedulerError::RetryableConflict`], or [`SchedulerError::Store`].
    pub async fn cancel(
        &self,
        reservation_id: ReservationId,
        caller_user_id: &str,
    ) -> SchedulerResult<Reservation> {
        let caller = UserId::new(caller_user_id)?;
        let (_guards, mut reservation) = self.lock_reservation(reservation_id, None).await?;
        if reservation.user_id() != &caller {
            return Err(SchedulerError::Authorization {
                reservation_id,
                caller,
            });
        }
        reservation.transition_to(ReservationStatus::Cancelled, &*self.clock)?;
        self.reservations.update(&reservation).await?;
        info!(%reservation_id, "reservation cancelled");
        Ok(reservation)
    }

    /// Returns the day's slot sequence for a party of the given size.
    ///
    /// Advisory, not binding: no lock is taken, and a slot shown as free may
    /// be gone by the time a booking for it arrives.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Validation`] for an unbookable party size, or
    /// [`SchedulerError::Store`].
    pub async fn get_availability(
        &self,
        date: NaiveDate,
        party_size: u32,
    ) -> SchedulerResult<DaySchedule> {
        let party = PartySize::new(party_size)?;
        Ok(self.availability.day_slots(date, party).await?)
    }

    /// Retrieves one reservation, returning `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Store`] on store failure.
    pub async fn get_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> SchedulerResult<Option<Reservation>> {
        Ok(self.reservations.find_by_id(reservation_id).await?)
    }

    /// Returns one user's reservations in every status, ordered by date
    /// then time.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Validation`] for an empty user id, or
    /// [`SchedulerError::Store`].
    pub async fn reservations_for_user(
        &self,
        user_id: &str,
    ) -> SchedulerResult<Vec<Reservation>> {
        let owner = UserId::new(user_id)?;
        Ok(self.reservations.query_by_user(&owner).await?)
    }

    /// Returns the table catalog, ordered by label.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Store`] on store failure.
    pub async fn list_tables(&self, include_inactive: bool) -> SchedulerResult<Vec<Table>> {
        let tables = if include_inactive {
            self.tables.list_all().await?
        } else {
            self.tables.list_active().await?
        };
        Ok(tables)
    }

    /// Retrieves one table, returning `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Store`] on store failure.
    pub async fn get_table(&self, table_id: TableId) -> SchedulerResult<Option<Table>> {
        Ok(self.tables.find_by_id(table_id).await?)
    }

    /// Adds a table to the catalog.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Validation`] for a bad label or capacity,
    /// [`SchedulerError::Conflict`] when the label is taken, or
    /// [`SchedulerError::Store`].
    pub async fn create_table(
        &self,
        number: impl Into<String> + Send,
        capacity: u32,
    ) -> SchedulerResult<Table> {
        let label = TableNumber::new(number)?;
        let seats = Capacity::new(capacity)?;
        if self.tables.find_by_number(&label).await?.is_some() {
            return Err(SchedulerError::Conflict(ConflictReason::TableNumberTaken(
                label,
            )));
        }
        let table = Table::new(label, seats, &*self.clock);
        match self.tables.insert(&table).await {
            Ok(()) => {}
            // Lost a race on the label between the pre-check and the insert.
            Err(StoreError::DuplicateTableNumber(taken)) => {
                return Err(SchedulerError::Conflict(ConflictReason::TableNumberTaken(
                    taken,
                )));
            }
            Err(other) => return Err(other.into()),
        }
        info!(table_id = %table.id(), number = %table.number(), "table created");
        Ok(table)
    }

    /// Edits a table's label, capacity, and active flag.
    ///
    /// Deactivating a table stops new bookings while keeping its existing
    /// reservations.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Validation`], [`SchedulerError::NotFound`],
    /// [`SchedulerError::Conflict`] when the new label belongs to another
    /// table, or [`SchedulerError::Store`].
    pub async fn update_table(
        &self,
        table_id: TableId,
        number: impl Into<String> + Send,
        capacity: u32,
        active: bool,
    ) -> SchedulerResult<Table> {
        let label = TableNumber::new(number)?;
        let seats = Capacity::new(capacity)?;
        let mut table = self.require_table(table_id).await?;
        let label_taken = self
            .tables
            .find_by_number(&label)
            .await?
            .is_some_and(|owner| owner.id() != table_id);
        if label_taken {
            return Err(SchedulerError::Conflict(ConflictReason::TableNumberTaken(
                label,
            )));
        }
        table.update(label, seats, active, &*self.clock);
        match self.tables.update(&table).await {
            Ok(()) => {}
            Err(StoreError::DuplicateTableNumber(taken)) => {
                return Err(SchedulerError::Conflict(ConflictReason::TableNumberTaken(
                    taken,
                )));
            }
            Err(other) => return Err(other.into()),
        }
        info!(%table_id, "table updated");
        Ok(table)
    }

    /// Removes a table that no reservation references.
    ///
    /// Tables with booking history are deactivated instead, preserving the
    /// historical record.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Conflict`] while reservations reference the table,
    /// [`SchedulerError::NotFound`], [`SchedulerError::RetryableConflict`],
    /// or [`SchedulerError::Store`].
    pub async fn delete_table(&self, table_id: TableId) -> SchedulerResult<()> {
        let _guard = self.lock_table(table_id).await?;
        if self.reservations.exists_for_table(table_id).await? {
            return Err(SchedulerError::Conflict(
                ConflictReason::TableHasReservations(table_id),
            ));
        }
        self.tables.delete(table_id).await?;
        // The lock entry would otherwise outlive the table; in-flight
        // holders keep the mutex alive through their own `Arc`.
        self.table_locks.remove(&table_id);
        info!(%table_id, "table deleted");
        Ok(())
    }

    /// Returns how many tables currently have a lock entry.
    #[cfg(test)]
    pub(crate) fn table_lock_entries(&self) -> usize {
        self.table_locks.len()
    }

    /// Locks the tables relevant to a reservation mutation and returns a
    /// fresh read of the reservation taken under those locks.
    ///
    /// Locks the reservation's current table, plus `target` when it names a
    /// different table. A concurrent [`update`](Self::update) may move the
    /// reservation between the initial read and the lock acquisition, so
    /// the read is retried until the held lock matches the reservation's
    /// current placement.
    async fn lock_reservation(
        &self,
        reservation_id: ReservationId,
        target: Option<TableId>,
    ) -> SchedulerResult<(TableLockGuards, Reservation)> {
        loop {
            let snapshot = self.require_reservation(reservation_id).await?;
            let guards = self.lock_tables(snapshot.table_id(), target).await?;
            let current = self.require_reservation(reservation_id).await?;
            if current.table_id() == snapshot.table_id() {
                return Ok((guards, current));
            }
        }
    }

    /// Acquires one or two per-table locks in ascending identifier order,
    /// so concurrent two-table operations cannot deadlock.
    async fn lock_tables(
        &self,
        current: TableId,
        target: Option<TableId>,
    ) -> SchedulerResult<TableLockGuards> {
        match target {
            Some(other) if other != current => {
                let (first, second) = if other < current {
                    (other, current)
                } else {
                    (current, other)
                };
                let first_guard = self.lock_table(first).await?;
                let second_guard = self.lock_table(second).await?;
                Ok((first_guard, Some(second_guard)))
            }
            _ => Ok((self.lock_table(current).await?, None)),
        }
    }

    /// Acquires the exclusive per-table lock, bounded by the configured
    /// timeout.
    async fn lock_table(&self, table_id: TableId) -> SchedulerResult<OwnedMutexGuard<()>> {
        let lock = Arc::clone(
            self.table_locks
                .entry(table_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        match tokio::time::timeout(self.lock_timeout, lock.lock_owned()).await {
            Ok(guard) => Ok(guard),
            Err(_) => {
                warn!(%table_id, "table lock acquisition timed out");
                Err(SchedulerError::RetryableConflict(table_id))
            }
        }
    }

    async fn require_table(&self, table_id: TableId) -> SchedulerResult<Table> {
        self.tables
            .find_by_id(table_id)
            .await?
            .ok_or(SchedulerError::NotFound(MissingEntity::Table(table_id)))
    }

    async fn require_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> SchedulerResult<Reservation> {
        self.reservations
            .find_by_id(reservation_id)
            .await?
            .ok_or(SchedulerError::NotFound(MissingEntity::Reservation(
                reservation_id,
            )))
    }
}
