//! In-memory reservation store.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::reservation::{
    domain::{Reservation, ReservationId, TableId, UserId},
    ports::{ReservationStore, StoreError, StoreResult},
};

/// Thread-safe in-memory reservation store.
///
/// Keeps a `(table, date)` index because that lookup sits on the
/// conflict-check hot path; the user and day queries scan.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReservationStore {
    state: Arc<RwLock<InMemoryReservationState>>,
}

#[derive(Debug, Default)]
struct InMemoryReservationState {
    reservations: HashMap<ReservationId, Reservation>,
    table_date_index: HashMap<(TableId, NaiveDate), Vec<ReservationId>>,
}

impl InMemoryReservationStore {
    /// Creates an empty in-memory reservation store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn index_placement(state: &mut InMemoryReservationState, reservation: &Reservation) {
    state
        .table_date_index
        .entry((reservation.table_id(), reservation.date()))
        .or_default()
        .push(reservation.id());
}

/// Removes a reservation id from its placement index entry, cleaning up the
/// entry when empty.
fn remove_placement(
    state: &mut InMemoryReservationState,
    id: ReservationId,
    key: (TableId, NaiveDate),
) {
    if let Some(ids) = state.table_date_index.get_mut(&key) {
        ids.retain(|existing| *existing != id);
        if ids.is_empty() {
            state.table_date_index.remove(&key);
        }
    }
}

fn sorted_by_schedule(mut reservations: Vec<Reservation>) -> Vec<Reservation> {
    reservations.sort_by_key(|r| (r.date(), r.time()));
    reservations
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn insert(&self, reservation: &Reservation) -> StoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        if state.reservations.contains_key(&reservation.id()) {
            return Err(StoreError::DuplicateReservation(reservation.id()));
        }
        index_placement(&mut state, reservation);
        state.reservations.insert(reservation.id(), reservation.clone());
        Ok(())
    }

    async fn update(&self, reservation: &Reservation) -> StoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let previous = state
            .reservations
            .get(&reservation.id())
            .ok_or(StoreError::ReservationNotFound(reservation.id()))?
            .clone();
        remove_placement(
            &mut state,
            reservation.id(),
            (previous.table_id(), previous.date()),
        );
        index_placement(&mut state, reservation);
        state.reservations.insert(reservation.id(), reservation.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ReservationId) -> StoreResult<Option<Reservation>> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(state.reservations.get(&id).cloned())
    }

    async fn query_by_table_and_date(
        &self,
        table_id: TableId,
        date: NaiveDate,
    ) -> StoreResult<Vec<Reservation>> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let found = state
            .table_date_index
            .get(&(table_id, date))
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.reservations.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(sorted_by_schedule(found))
    }

    async fn query_active_by_user(&self, user_id: &UserId) -> StoreResult<Vec<Reservation>> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let found = state
            .reservations
            .values()
            .filter(|r| r.user_id() == user_id && r.is_active())
            .cloned()
            .collect();
        Ok(sorted_by_schedule(found))
    }

    async fn query_active_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Reservation>> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let found = state
            .reservations
            .values()
            .filter(|r| r.date() == date && r.is_active())
            .cloned()
            .collect();
        Ok(sorted_by_schedule(found))
    }

    async fn query_by_user(&self, user_id: &UserId) -> StoreResult<Vec<Reservation>> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let found = state
            .reservations
            .values()
            .filter(|r| r.user_id() == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_schedule(found))
    }

    async fn exists_for_table(&self, table_id: TableId) -> StoreResult<bool> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(state
            .reservations
            .values()
            .any(|r| r.table_id() == table_id))
    }
}
