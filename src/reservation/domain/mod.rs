//! Domain model for restaurant table reservations.
//!
//! The reservation domain models the seating catalog, booking placement,
//! the reservation status lifecycle, and the restaurant's validated
//! operating parameters while keeping all infrastructure concerns outside
//! of the domain boundary.

mod config;
mod error;
mod ids;
mod reservation;
mod table;

pub use config::{RestaurantConfig, SLOT_CADENCE_MINUTES};
pub use error::{ConfigError, ParseStatusError, ReservationDomainError};
pub use ids::{Capacity, PartySize, ReservationId, TableId, TableNumber, UserId};
pub use reservation::{
    BookingDetails, PersistedReservationData, Reservation, ReservationStatus,
};
pub use table::{PersistedTableData, Table};
