//! Port contracts for reservation scheduling.
//!
//! Ports define infrastructure-agnostic interfaces used by the scheduling
//! services: persistence stores and the configuration provider.

pub mod settings;
pub mod stores;

pub use settings::{SettingKey, SettingsError, SettingsProvider};
pub use stores::{ReservationStore, StoreError, StoreResult, TableStore};
