//! Per-user and per-day reservation cap enforcement.

use crate::reservation::{
    domain::{RestaurantConfig, UserId},
    ports::{ReservationStore, StoreResult},
};
use chrono::NaiveDate;
use std::sync::Arc;

/// Enforces the active-reservation caps.
///
/// Both checks run before any table-availability work, cheapest rejection
/// first, and are re-evaluated at booking time inside the scheduler's
/// atomicity boundary; capacity is never reserved ahead of the check.
#[derive(Clone)]
pub struct LimitPolicy<R>
where
    R: ReservationStore,
{
    reservations: Arc<R>,
    config: RestaurantConfig,
}

impl<R> LimitPolicy<R>
where
    R: ReservationStore,
{
    /// Creates a new limit policy.
    #[must_use]
    pub const fn new(reservations: Arc<R>, config: RestaurantConfig) -> Self {
        Self {
            reservations,
            config,
        }
    }

    /// Returns false once the user's own active reservations, across all
    /// dates, reach the per-user cap.
    ///
    /// Only the caller's pending and confirmed reservations count; other
    /// users' bookings never affect this check.
    ///
    /// # Errors
    ///
    /// Propagates reservation store failures.
    pub async fn can_user_book(&self, user_id: &UserId) -> StoreResult<bool> {
        let active = self.reservations.query_active_by_user(user_id).await?;
        Ok(active.len() < self.config.max_reservations_per_user())
    }

    /// Returns false once active reservations on the day reach the per-day
    /// cap.
    ///
    /// # Errors
    ///
    /// Propagates reservation store failures.
    pub async fn can_day_accept(&self, date: NaiveDate) -> StoreResult<bool> {
        let active = self.reservations.query_active_by_date(date).await?;
        Ok(active.len() < self.config.max_reservations_per_day())
    }
}
