//! Table aggregate for the physical seating catalog.

use super::{Capacity, PartySize, ReservationDomainError, TableId, TableNumber};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A physical table in the dining room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    id: TableId,
    number: TableNumber,
    capacity: Capacity,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTableData {
    /// Persisted table identifier.
    pub id: TableId,
    /// Persisted human-facing label.
    pub number: TableNumber,
    /// Persisted seat count.
    pub capacity: Capacity,
    /// Persisted active flag.
    pub active: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Table {
    /// Creates a new active table.
    #[must_use]
    pub fn new(number: TableNumber, capacity: Capacity, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TableId::new(),
            number,
            capacity,
            active: true,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a table from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTableData) -> Self {
        Self {
            id: data.id,
            number: data.number,
            capacity: data.capacity,
            active: data.active,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the table identifier.
    #[must_use]
    pub const fn id(&self) -> TableId {
        self.id
    }

    /// Returns the human-facing label.
    #[must_use]
    pub const fn number(&self) -> &TableNumber {
        &self.number
    }

    /// Returns the seat count.
    #[must_use]
    pub const fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Returns true when the table accepts new bookings.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Checks that this table can take a new booking for the given party.
    ///
    /// Deactivated tables keep their existing reservations for historical
    /// integrity but reject new ones.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationDomainError::InactiveTable`] when the table is
    /// deactivated, or [`ReservationDomainError::PartyExceedsCapacity`] when
    /// the party does not fit.
    pub const fn check_bookable(&self, party: PartySize) -> Result<(), ReservationDomainError> {
        if !self.active {
            return Err(ReservationDomainError::InactiveTable(self.id));
        }
        if !self.capacity.fits(party) {
            return Err(ReservationDomainError::PartyExceedsCapacity {
                party: party.value(),
                capacity: self.capacity.value(),
            });
        }
        Ok(())
    }

    /// Replaces the label, seat count, and active flag.
    pub fn update(
        &mut self,
        number: TableNumber,
        capacity: Capacity,
        active: bool,
        clock: &impl Clock,
    ) {
        self.number = number;
        self.capacity = capacity;
        self.active = active;
        self.updated_at = clock.utc();
    }
}
