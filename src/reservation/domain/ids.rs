//! Identifier and validated scalar types for the reservation domain.

use super::ReservationDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a reservation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(Uuid);

impl ReservationId {
    /// Creates a new random reservation identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a reservation identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a physical table.
///
/// Ordered so that operations locking two tables can always acquire the
/// locks in a single global order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(Uuid);

impl TableId {
    /// Creates a new random table identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a table identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TableId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user owning a reservation.
///
/// Opaque to this crate; identity management lives with an external
/// collaborator. Only non-emptiness is enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a validated user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationDomainError::EmptyUserId`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ReservationDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(ReservationDomainError::EmptyUserId);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-facing table label, unique within the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableNumber(String);

impl TableNumber {
    /// Longest accepted table label.
    const MAX_LENGTH: usize = 20;

    /// Creates a validated table label.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationDomainError::InvalidTableNumber`] when the value
    /// is empty after trimming or longer than 20 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ReservationDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() || normalized.chars().count() > Self::MAX_LENGTH {
            return Err(ReservationDomainError::InvalidTableNumber(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the label as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TableNumber {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TableNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of guests covered by a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartySize(u32);

impl PartySize {
    /// Largest bookable party.
    pub const MAX: u32 = 20;

    /// Creates a validated party size.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationDomainError::InvalidPartySize`] when the value is
    /// outside `1..=20`.
    pub const fn new(value: u32) -> Result<Self, ReservationDomainError> {
        if value == 0 || value > Self::MAX {
            return Err(ReservationDomainError::InvalidPartySize(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying guest count.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PartySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Seating capacity of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capacity(u32);

impl Capacity {
    /// Largest table the restaurant operates.
    pub const MAX: u32 = 20;

    /// Creates a validated capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationDomainError::InvalidCapacity`] when the value is
    /// outside `1..=20`.
    pub const fn new(value: u32) -> Result<Self, ReservationDomainError> {
        if value == 0 || value > Self::MAX {
            return Err(ReservationDomainError::InvalidCapacity(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying seat count.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns true when a party of the given size fits at this table.
    #[must_use]
    pub const fn fits(self, party: PartySize) -> bool {
        party.value() <= self.0
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
