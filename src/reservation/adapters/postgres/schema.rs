//! Diesel schema for reservation persistence.

diesel::table! {
    /// Physical tables in the dining room.
    dining_tables (id) {
        /// Table identifier.
        id -> Uuid,
        /// Human-facing table label, unique.
        #[max_length = 20]
        table_number -> Varchar,
        /// Seat count.
        capacity -> Integer,
        /// Whether the table accepts new bookings.
        active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Booking records, never physically removed.
    reservations (id) {
        /// Reservation identifier.
        id -> Uuid,
        /// Owning user identifier.
        user_id -> Varchar,
        /// Booked table identifier.
        table_id -> Uuid,
        /// Calendar day of the visit.
        reservation_date -> Date,
        /// Start of the occupancy window.
        reservation_time -> Time,
        /// Guest count.
        party_size -> Integer,
        /// Optional free-text note.
        #[max_length = 500]
        special_requests -> Nullable<Varchar>,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(reservations -> dining_tables (table_id));
diesel::allow_tables_to_appear_in_same_query!(dining_tables, reservations);
