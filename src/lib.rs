//! Maitre: restaurant table-reservation scheduling core.
//!
//! This crate implements the part of a restaurant system with real
//! invariants: the seating catalog, the booking calendar, availability
//! queries, reservation caps, and the booking status lifecycle. HTTP
//! routing, authentication, menu CRUD, and persistence-engine choice are
//! external collaborators reached through ports.
//!
//! # Architecture
//!
//! Maitre follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, settings)
//!
//! # Modules
//!
//! - [`reservation`]: the scheduling core: catalog, availability, limits,
//!   lifecycle, and the scheduler facade

pub mod reservation;
