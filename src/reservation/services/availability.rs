//! Availability computation over the table catalog and booking calendar.

use crate::reservation::{
    domain::{PartySize, Reservation, ReservationId, RestaurantConfig, Table, TableId},
    ports::{ReservationStore, StoreResult, TableStore},
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// One candidate booking slot in a day schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Start of the occupancy window.
    pub time: NaiveTime,
    /// Whether at least one suitable table is free.
    pub is_available: bool,
    /// Every free table that fits the party, ordered by label.
    pub available_table_ids: Vec<TableId>,
}

/// The full slot sequence for one day and party size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    /// Day the schedule describes.
    pub date: NaiveDate,
    /// Ordered candidate slots.
    pub slots: Vec<TimeSlot>,
}

/// Computes table/time-slot availability and detects overlap conflicts.
///
/// A pure function of the catalog, the existing reservations, and the
/// restaurant configuration; holds no state of its own.
#[derive(Clone)]
pub struct AvailabilityEngine<R, T>
where
    R: ReservationStore,
    T: TableStore,
{
    reservations: Arc<R>,
    tables: Arc<T>,
    config: RestaurantConfig,
}

impl<R, T> AvailabilityEngine<R, T>
where
    R: ReservationStore,
    T: TableStore,
{
    /// Creates a new availability engine.
    #[must_use]
    pub const fn new(reservations: Arc<R>, tables: Arc<T>, config: RestaurantConfig) -> Self {
        Self {
            reservations,
            tables,
            config,
        }
    }

    /// Returns true when no active reservation on the table/date overlaps
    /// the occupancy window starting at `time`.
    ///
    /// `exclude` ignores the reservation being updated, and only that one;
    /// back-to-back windows never conflict.
    ///
    /// # Errors
    ///
    /// Propagates reservation store failures.
    pub async fn is_table_free(
        &self,
        table_id: TableId,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<ReservationId>,
    ) -> StoreResult<bool> {
        let booked = self
            .reservations
            .query_by_table_and_date(table_id, date)
            .await?;
        Ok(!booked
            .iter()
            .any(|existing| self.blocks(existing, time, exclude)))
    }

    /// Returns all active tables with sufficient capacity that are free at
    /// the given time.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn list_available_tables(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        party_size: PartySize,
    ) -> StoreResult<Vec<Table>> {
        let candidates = self.tables.list_active().await?;
        let mut available = Vec::new();
        for table in candidates {
            if !table.capacity().fits(party_size) {
                continue;
            }
            if self.is_table_free(table.id(), date, time, None).await? {
                available.push(table);
            }
        }
        Ok(available)
    }

    /// Generates the ordered slot sequence for one day.
    ///
    /// Slots start at the opening time and advance at the fixed 30-minute
    /// cadence while the full occupancy window fits before closing; each
    /// slot is checked independently for table availability.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn day_slots(&self, date: NaiveDate, party_size: PartySize) -> StoreResult<DaySchedule> {
        let mut slots = Vec::new();
        for time in self.config.slot_starts() {
            let tables = self.list_available_tables(date, time, party_size).await?;
            slots.push(TimeSlot {
                time,
                is_available: !tables.is_empty(),
                available_table_ids: tables.iter().map(Table::id).collect(),
            });
        }
        debug!(%date, party = party_size.value(), slots = slots.len(), "generated day schedule");
        Ok(DaySchedule { date, slots })
    }

    /// Whether an existing reservation blocks a new occupancy window
    /// starting at `time`.
    fn blocks(
        &self,
        existing: &Reservation,
        time: NaiveTime,
        exclude: Option<ReservationId>,
    ) -> bool {
        if !existing.is_active() {
            return false;
        }
        if exclude == Some(existing.id()) {
            return false;
        }
        self.config.windows_overlap(existing.time(), time)
    }
}
