//! Settings port and the typed [`RestaurantConfig`] loader built on it.
//!
//! The configuration store is an external collaborator exposing string
//! values under well-known keys. Absent keys fall back to the documented
//! defaults; malformed values fail fast with [`ConfigError`] instead of
//! silently degrading the slot sequence.

use crate::reservation::domain::{ConfigError, RestaurantConfig};
use async_trait::async_trait;
use chrono::NaiveTime;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Well-known configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Restaurant opening time, `HH:MM`.
    OpeningTime,
    /// Restaurant closing time, `HH:MM`.
    ClosingTime,
    /// Occupancy-window length in minutes.
    ReservationTimeSlotDuration,
    /// Cap on a single user's active reservations.
    MaxReservationsPerUser,
    /// Cap on active reservations per calendar day.
    MaxReservationsPerDay,
    /// How many days in advance bookings are allowed.
    BookingAdvanceDays,
}

impl SettingKey {
    /// Returns the storage key string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpeningTime => "OPENING_TIME",
            Self::ClosingTime => "CLOSING_TIME",
            Self::ReservationTimeSlotDuration => "RESERVATION_TIME_SLOT_DURATION",
            Self::MaxReservationsPerUser => "MAX_RESERVATIONS_PER_USER",
            Self::MaxReservationsPerDay => "MAX_RESERVATIONS_PER_DAY",
            Self::BookingAdvanceDays => "BOOKING_ADVANCE_DAYS",
        }
    }

    /// Returns the value assumed when the key is absent.
    #[must_use]
    pub const fn default_value(self) -> &'static str {
        match self {
            Self::OpeningTime => "11:00",
            Self::ClosingTime => "22:00",
            Self::ReservationTimeSlotDuration => "120",
            Self::MaxReservationsPerUser => "3",
            Self::MaxReservationsPerDay => "50",
            Self::BookingAdvanceDays => "30",
        }
    }
}

/// Configuration store contract.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Reads one setting, returning `None` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the underlying store fails.
    async fn get(&self, key: SettingKey) -> Result<Option<String>, SettingsError>;
}

/// Errors returned by settings provider implementations.
#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    /// The settings store could not be read.
    #[error("settings lookup failed: {0}")]
    Lookup(Arc<dyn std::error::Error + Send + Sync>),
}

impl SettingsError {
    /// Wraps a lookup failure.
    pub fn lookup(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Lookup(Arc::new(err))
    }
}

impl RestaurantConfig {
    /// Loads and validates the configuration from a settings provider.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the provider fails, a value does not
    /// parse, or the resulting hours/slot duration are inconsistent.
    pub async fn from_settings<P>(provider: &P) -> Result<Self, ConfigError>
    where
        P: SettingsProvider + ?Sized,
    {
        let opening_time = parse_time(provider, SettingKey::OpeningTime).await?;
        let closing_time = parse_time(provider, SettingKey::ClosingTime).await?;
        let slot_duration_minutes =
            parse_number(provider, SettingKey::ReservationTimeSlotDuration).await?;
        let max_per_user = parse_number(provider, SettingKey::MaxReservationsPerUser).await?;
        let max_per_day = parse_number(provider, SettingKey::MaxReservationsPerDay).await?;
        let booking_advance_days = parse_number(provider, SettingKey::BookingAdvanceDays).await?;

        Self::new(
            opening_time,
            closing_time,
            slot_duration_minutes,
            max_per_user,
            max_per_day,
            booking_advance_days,
        )
    }
}

/// Reads one key, substituting the documented default when absent.
async fn raw_value<P>(provider: &P, key: SettingKey) -> Result<String, ConfigError>
where
    P: SettingsProvider + ?Sized,
{
    let stored = provider
        .get(key)
        .await
        .map_err(|err| ConfigError::Settings(err.to_string()))?;
    Ok(stored.unwrap_or_else(|| key.default_value().to_owned()))
}

async fn parse_time<P>(provider: &P, key: SettingKey) -> Result<NaiveTime, ConfigError>
where
    P: SettingsProvider + ?Sized,
{
    let value = raw_value(provider, key).await?;
    NaiveTime::parse_from_str(&value, "%H:%M").map_err(|_| ConfigError::MalformedSetting {
        key: key.as_str(),
        value,
    })
}

async fn parse_number<P, N>(provider: &P, key: SettingKey) -> Result<N, ConfigError>
where
    P: SettingsProvider + ?Sized,
    N: FromStr,
{
    let value = raw_value(provider, key).await?;
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::MalformedSetting {
            key: key.as_str(),
            value,
        })
}
