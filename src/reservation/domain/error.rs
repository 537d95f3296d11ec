//! Error types for reservation domain validation, parsing, and configuration.

use super::{ReservationId, ReservationStatus, TableId};
use thiserror::Error;

/// Errors returned while constructing or mutating domain reservation values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReservationDomainError {
    /// The user identifier is empty after trimming.
    #[error("user id must not be empty")]
    EmptyUserId,

    /// The table label is empty or too long.
    #[error("invalid table number '{0}', expected 1..=20 characters")]
    InvalidTableNumber(String),

    /// The party size is outside the bookable range.
    #[error("invalid party size {0}, expected 1..=20")]
    InvalidPartySize(u32),

    /// The table capacity is outside the operated range.
    #[error("invalid table capacity {0}, expected 1..=20")]
    InvalidCapacity(u32),

    /// The special-requests note exceeds the stored column width.
    #[error("special requests too long ({0} characters, maximum 500)")]
    SpecialRequestsTooLong(usize),

    /// The party does not fit at the requested table.
    #[error("party of {party} exceeds table capacity of {capacity}")]
    PartyExceedsCapacity {
        /// Requested guest count.
        party: u32,
        /// Seats the table offers.
        capacity: u32,
    },

    /// The table does not accept new bookings.
    #[error("table {0} is inactive and does not accept new bookings")]
    InactiveTable(TableId),

    /// The requested status move is not an edge of the lifecycle table.
    #[error("invalid status transition for reservation {reservation_id}: {from:?} -> {to:?}")]
    InvalidStatusTransition {
        /// Reservation being transitioned.
        reservation_id: ReservationId,
        /// Current lifecycle status.
        from: ReservationStatus,
        /// Requested lifecycle status.
        to: ReservationStatus,
    },
}

/// Error returned while parsing reservation statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown reservation status: {0}")]
pub struct ParseStatusError(pub String);

/// Errors returned while building [`RestaurantConfig`] values.
///
/// These indicate misconfiguration and are fatal at startup; none of them
/// occur on the booking path.
///
/// [`RestaurantConfig`]: super::RestaurantConfig
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A settings value failed to parse into its expected shape.
    #[error("malformed setting {key}: cannot parse '{value}'")]
    MalformedSetting {
        /// Settings key that was read.
        key: &'static str,
        /// Raw value that failed to parse.
        value: String,
    },

    /// The slot duration must be at least one minute.
    #[error("slot duration must be positive, got {0} minutes")]
    NonPositiveSlotDuration(u32),

    /// Opening hours must describe a non-empty window.
    #[error("opening time {opening} must precede closing time {closing}")]
    InvalidHours {
        /// Configured opening time.
        opening: chrono::NaiveTime,
        /// Configured closing time.
        closing: chrono::NaiveTime,
    },

    /// The settings provider itself failed.
    #[error("settings provider failure: {0}")]
    Settings(String),
}
