//! Table-reservation scheduling for the restaurant core.
//!
//! This module answers "what tables are free at time T for a party of N",
//! accepts or rejects new and changed bookings without double-booking,
//! enforces per-user and per-day caps, and drives each booking through its
//! status lifecycle. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
