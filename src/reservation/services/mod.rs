//! Application services for reservation scheduling.

mod availability;
mod limits;
mod scheduler;

pub use availability::{AvailabilityEngine, DaySchedule, TimeSlot};
pub use limits::LimitPolicy;
pub use scheduler::{
    ConflictReason, CreateReservationRequest, MissingEntity, ReservationScheduler, SchedulerError,
    SchedulerResult, UpdateReservationRequest,
};
