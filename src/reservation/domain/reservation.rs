//! Reservation aggregate root and its status lifecycle.

use super::{ParseStatusError, PartySize, ReservationDomainError, ReservationId, TableId, UserId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Longest accepted special-requests note.
const MAX_SPECIAL_REQUESTS_LENGTH: usize = 500;

/// Reservation lifecycle status.
///
/// `Pending` and `Confirmed` reservations occupy their table and count
/// toward booking limits; the remaining statuses are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Booking accepted, awaiting staff confirmation.
    Pending,
    /// Booking confirmed by staff.
    Confirmed,
    /// Booking withdrawn by the guest or staff.
    Cancelled,
    /// The party was seated and the visit concluded.
    Completed,
    /// The party never arrived.
    NoShow,
}

impl ReservationStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::NoShow => "no_show",
        }
    }

    /// Returns true when the reservation occupies its table and counts
    /// toward limits.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Returns true when no further transitions are permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed | Self::NoShow)
    }

    /// Returns true when moving from `self` to `target` is an edge of the
    /// lifecycle table.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled)
                | (Self::Confirmed, Self::Completed)
                | (Self::Confirmed, Self::NoShow)
        )
    }
}

impl TryFrom<&str> for ReservationStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            "no_show" => Ok(Self::NoShow),
            _ => Err(ParseStatusError(value.to_owned())),
        }
    }
}

/// Booking placement: which table, when, and for how many guests.
///
/// Grouped because create and update validate these fields as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDetails {
    /// Target table.
    pub table_id: TableId,
    /// Calendar day of the visit.
    pub date: NaiveDate,
    /// Start of the occupancy window.
    pub time: NaiveTime,
    /// Guest count.
    pub party_size: PartySize,
    /// Optional free-text note, at most 500 characters.
    pub special_requests: Option<String>,
}

/// Reservation aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    id: ReservationId,
    user_id: UserId,
    table_id: TableId,
    date: NaiveDate,
    time: NaiveTime,
    party_size: PartySize,
    special_requests: Option<String>,
    status: ReservationStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedReservationData {
    /// Persisted reservation identifier.
    pub id: ReservationId,
    /// Persisted owner identifier.
    pub user_id: UserId,
    /// Persisted booking placement.
    pub details: BookingDetails,
    /// Persisted lifecycle status.
    pub status: ReservationStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Creates a new `Pending` reservation for the given owner and placement.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationDomainError::SpecialRequestsTooLong`] when the
    /// note exceeds 500 characters.
    pub fn new(
        user_id: UserId,
        details: BookingDetails,
        clock: &impl Clock,
    ) -> Result<Self, ReservationDomainError> {
        validate_special_requests(details.special_requests.as_deref())?;
        let timestamp = clock.utc();

        Ok(Self {
            id: ReservationId::new(),
            user_id,
            table_id: details.table_id,
            date: details.date,
            time: details.time,
            party_size: details.party_size,
            special_requests: details.special_requests,
            status: ReservationStatus::Pending,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a reservation from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedReservationData) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            table_id: data.details.table_id,
            date: data.details.date,
            time: data.details.time,
            party_size: data.details.party_size,
            special_requests: data.details.special_requests,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the reservation identifier.
    #[must_use]
    pub const fn id(&self) -> ReservationId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the booked table.
    #[must_use]
    pub const fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Returns the calendar day of the visit.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the start of the occupancy window.
    #[must_use]
    pub const fn time(&self) -> NaiveTime {
        self.time
    }

    /// Returns the guest count.
    #[must_use]
    pub const fn party_size(&self) -> PartySize {
        self.party_size
    }

    /// Returns the special-requests note, if any.
    #[must_use]
    pub fn special_requests(&self) -> Option<&str> {
        self.special_requests.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ReservationStatus {
        self.status
    }

    /// Returns true when the reservation occupies its table.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the booking placement.
    ///
    /// Capacity, ownership, and availability checks are the scheduler's
    /// responsibility; only field-level validation happens here.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationDomainError::SpecialRequestsTooLong`] when the
    /// note exceeds 500 characters.
    pub fn reschedule(
        &mut self,
        details: BookingDetails,
        clock: &impl Clock,
    ) -> Result<(), ReservationDomainError> {
        validate_special_requests(details.special_requests.as_deref())?;
        self.table_id = details.table_id;
        self.date = details.date;
        self.time = details.time;
        self.party_size = details.party_size;
        self.special_requests = details.special_requests;
        self.touch(clock);
        Ok(())
    }

    /// Moves the reservation to a new lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationDomainError::InvalidStatusTransition`] when the
    /// move is not an edge of the lifecycle table; the reservation is left
    /// untouched.
    pub fn transition_to(
        &mut self,
        target: ReservationStatus,
        clock: &impl Clock,
    ) -> Result<(), ReservationDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(ReservationDomainError::InvalidStatusTransition {
                reservation_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

/// Rejects special-requests notes wider than the stored column.
fn validate_special_requests(note: Option<&str>) -> Result<(), ReservationDomainError> {
    let length = note.map_or(0, |text| text.chars().count());
    if length > MAX_SPECIAL_REQUESTS_LENGTH {
        return Err(ReservationDomainError::SpecialRequestsTooLong(length));
    }
    Ok(())
}
