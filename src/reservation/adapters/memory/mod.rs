//! Thread-safe in-memory adapters for tests and development.

mod reservations;
mod settings;
mod tables;

pub use reservations::InMemoryReservationStore;
pub use settings::InMemorySettingsProvider;
pub use tables::InMemoryTableStore;
