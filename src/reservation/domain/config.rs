//! Validated restaurant operating parameters and occupancy time math.

use super::ConfigError;
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Cadence at which candidate booking slots are generated.
///
/// Independent of the occupancy-window length: a 120-minute dinner slot may
/// still start at any half hour.
pub const SLOT_CADENCE_MINUTES: u32 = 30;

/// Validated operating parameters for the restaurant.
///
/// Constructed once at startup and injected into the scheduler; there is no
/// ambient configuration lookup. Malformed values are rejected here rather
/// than surfacing later as an empty slot sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantConfig {
    opening_time: NaiveTime,
    closing_time: NaiveTime,
    slot_duration_minutes: u32,
    max_reservations_per_user: usize,
    max_reservations_per_day: usize,
    booking_advance_days: u32,
}

impl RestaurantConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositiveSlotDuration`] when the slot
    /// duration is zero, or [`ConfigError::InvalidHours`] when the opening
    /// time does not precede the closing time.
    pub fn new(
        opening_time: NaiveTime,
        closing_time: NaiveTime,
        slot_duration_minutes: u32,
        max_reservations_per_user: usize,
        max_reservations_per_day: usize,
        booking_advance_days: u32,
    ) -> Result<Self, ConfigError> {
        if slot_duration_minutes == 0 {
            return Err(ConfigError::NonPositiveSlotDuration(slot_duration_minutes));
        }
        if opening_time.num_seconds_from_midnight() >= closing_time.num_seconds_from_midnight() {
            return Err(ConfigError::InvalidHours {
                opening: opening_time,
                closing: closing_time,
            });
        }
        Ok(Self {
            opening_time,
            closing_time,
            slot_duration_minutes,
            max_reservations_per_user,
            max_reservations_per_day,
            booking_advance_days,
        })
    }

    /// Returns the opening time.
    #[must_use]
    pub const fn opening_time(&self) -> NaiveTime {
        self.opening_time
    }

    /// Returns the closing time.
    #[must_use]
    pub const fn closing_time(&self) -> NaiveTime {
        self.closing_time
    }

    /// Returns the occupancy-window length in minutes.
    #[must_use]
    pub const fn slot_duration_minutes(&self) -> u32 {
        self.slot_duration_minutes
    }

    /// Returns the cap on a single user's active reservations.
    #[must_use]
    pub const fn max_reservations_per_user(&self) -> usize {
        self.max_reservations_per_user
    }

    /// Returns the cap on active reservations per calendar day.
    #[must_use]
    pub const fn max_reservations_per_day(&self) -> usize {
        self.max_reservations_per_day
    }

    /// Returns how many days ahead bookings may be placed.
    #[must_use]
    pub const fn booking_advance_days(&self) -> u32 {
        self.booking_advance_days
    }

    /// Tests whether two occupancy windows of configured length overlap.
    ///
    /// Windows are half-open, `[start, start + duration)`: a booking ending
    /// exactly when another begins does not conflict, and the test is
    /// symmetric in its arguments. Computed in seconds from midnight so the
    /// window arithmetic cannot wrap around the day boundary.
    #[must_use]
    pub fn windows_overlap(&self, first: NaiveTime, second: NaiveTime) -> bool {
        let duration = self.slot_duration_seconds();
        let a = i64::from(first.num_seconds_from_midnight());
        let b = i64::from(second.num_seconds_from_midnight());
        a < b + duration && b < a + duration
    }

    /// Returns every candidate slot start for one day, in order.
    ///
    /// Starts at the opening time and steps by [`SLOT_CADENCE_MINUTES`]
    /// while the full occupancy window still fits before closing.
    #[must_use]
    pub fn slot_starts(&self) -> Vec<NaiveTime> {
        let duration = self.slot_duration_seconds();
        let closing = i64::from(self.closing_time.num_seconds_from_midnight());
        let cadence = i64::from(SLOT_CADENCE_MINUTES) * 60;

        let mut starts = Vec::new();
        let mut current = i64::from(self.opening_time.num_seconds_from_midnight());
        while current + duration <= closing {
            // Bounded by closing < 24h, so the conversion always succeeds.
            let start = u32::try_from(current)
                .ok()
                .and_then(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, 0));
            if let Some(time) = start {
                starts.push(time);
            }
            current += cadence;
        }
        starts
    }

    fn slot_duration_seconds(&self) -> i64 {
        i64::from(self.slot_duration_minutes) * 60
    }
}
