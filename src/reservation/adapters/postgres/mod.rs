//! `PostgreSQL` adapters for reservation persistence.

mod models;
mod reservations;
mod schema;
mod tables;

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

pub use reservations::PostgresReservationStore;
pub use tables::PostgresTableStore;

/// `PostgreSQL` connection pool type used by the reservation adapters.
pub type ReservationPgPool = Pool<ConnectionManager<PgConnection>>;
