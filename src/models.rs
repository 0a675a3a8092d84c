use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub reset_code: Option<String>,
    #[serde(skip_serializing)]
    pub reset_code_expires_at: Option<DateTime<Utc>>,
    pub is_admin: bool,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Room {
    pub id: Uuid,
    pub room_number: String,
    pub room_type: String,
    pub capacity: i32,
    pub price: i64,
    pub status: String,
    pub occupancy: i32,
    pub amenities: Vec<String>,
    pub description: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Option<Uuid>,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub total_price: i64,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub number_of_guests: i32,
    pub special_requests: String,
    pub status: String,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub student_name: String,
    pub hostel_name: String,
    pub room_type: String,
    pub price: i64,
    pub payment_method: String,
    pub transaction_id: String,
    pub payment_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub admin_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking lifecycle states, persisted in kebab-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl BookingStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "checked-in" => Some(Self::CheckedIn),
            "checked-out" => Some(Self::CheckedOut),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::CheckedIn => "checked-in",
            Self::CheckedOut => "checked-out",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a booking in this state holds a bed in its room.
    pub fn counts_occupancy(&self) -> bool {
        matches!(self, Self::Confirmed | Self::CheckedIn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Available,
    Occupied,
    Maintenance,
}

impl RoomStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "occupied" => Some(Self::Occupied),
            "maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Maintenance => "maintenance",
        }
    }
}

/// Occupancy delta for a status change. Edge-triggered: the count moves only
/// when the booking crosses between the occupancy-active set
/// {confirmed, checked-in} and the inactive set {pending, cancelled,
/// checked-out}. Re-applying the same status is a no-op on the room.
pub fn occupancy_delta(from: BookingStatus, to: BookingStatus) -> i32 {
    match (from.counts_occupancy(), to.counts_occupancy()) {
        (false, true) => 1,
        (true, false) => -1,
        _ => 0,
    }
}

/// New (occupancy, status) for a room after applying `delta`. Occupancy is
/// clamped to `0 ..= capacity`. Maintenance is admin-set and sticky: occupancy
/// movement never changes the status of a room under maintenance.
pub fn apply_room_transition(
    occupancy: i32,
    capacity: i32,
    current: RoomStatus,
    delta: i32,
) -> (i32, RoomStatus) {
    let occupancy = (occupancy + delta).clamp(0, capacity.max(0));
    let status = if current == RoomStatus::Maintenance {
        RoomStatus::Maintenance
    } else if occupancy >= capacity {
        RoomStatus::Occupied
    } else {
        RoomStatus::Available
    };
    (occupancy, status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(
        room: (i32, RoomStatus),
        capacity: i32,
        from: BookingStatus,
        to: BookingStatus,
    ) -> (i32, RoomStatus) {
        apply_room_transition(room.0, capacity, room.1, occupancy_delta(from, to))
    }

    #[test]
    fn confirm_increments_once() {
        let room = step(
            (0, RoomStatus::Available),
            2,
            BookingStatus::Pending,
            BookingStatus::Confirmed,
        );
        assert_eq!(room, (1, RoomStatus::Available));
        // Confirming an already-confirmed booking must not double count.
        let room = step(room, 2, BookingStatus::Confirmed, BookingStatus::Confirmed);
        assert_eq!(room, (1, RoomStatus::Available));
    }

    #[test]
    fn check_in_after_confirm_keeps_count() {
        let room = step(
            (1, RoomStatus::Available),
            2,
            BookingStatus::Confirmed,
            BookingStatus::CheckedIn,
        );
        assert_eq!(room, (1, RoomStatus::Available));
    }

    #[test]
    fn cancel_of_pending_booking_is_noop() {
        let room = step(
            (1, RoomStatus::Available),
            2,
            BookingStatus::Pending,
            BookingStatus::Cancelled,
        );
        assert_eq!(room, (1, RoomStatus::Available));
    }

    #[test]
    fn full_room_becomes_occupied_and_back() {
        // capacity=2 at occupancy=1: confirm a second booking, then cancel one.
        let room = step(
            (1, RoomStatus::Available),
            2,
            BookingStatus::Pending,
            BookingStatus::Confirmed,
        );
        assert_eq!(room, (2, RoomStatus::Occupied));
        let room = step(room, 2, BookingStatus::Confirmed, BookingStatus::Cancelled);
        assert_eq!(room, (1, RoomStatus::Available));
    }

    #[test]
    fn occupancy_never_leaves_bounds() {
        let transitions = [
            (BookingStatus::Pending, BookingStatus::Confirmed),
            (BookingStatus::Confirmed, BookingStatus::Confirmed),
            (BookingStatus::Confirmed, BookingStatus::CheckedIn),
            (BookingStatus::CheckedIn, BookingStatus::CheckedOut),
            (BookingStatus::CheckedOut, BookingStatus::CheckedOut),
            (BookingStatus::CheckedOut, BookingStatus::Cancelled),
            (BookingStatus::Cancelled, BookingStatus::Confirmed),
        ];
        let mut room = (0, RoomStatus::Available);
        for (from, to) in transitions {
            room = step(room, 1, from, to);
            assert!(
                (0..=1).contains(&room.0),
                "occupancy {} out of bounds",
                room.0
            );
        }
    }

    #[test]
    fn maintenance_is_sticky() {
        let room = step(
            (0, RoomStatus::Maintenance),
            1,
            BookingStatus::Pending,
            BookingStatus::Confirmed,
        );
        assert_eq!(room, (1, RoomStatus::Maintenance));
        let room = step(room, 1, BookingStatus::Confirmed, BookingStatus::CheckedOut);
        assert_eq!(room, (0, RoomStatus::Maintenance));
    }

    #[test]
    fn status_round_trips() {
        for s in ["pending", "confirmed", "checked-in", "checked-out", "cancelled"] {
            let parsed = BookingStatus::parse(s).expect("known status");
            assert_eq!(parsed.as_str(), s);
        }
        assert!(BookingStatus::parse("shipped").is_none());
        assert!(RoomStatus::parse("unknown").is_none());
    }
}
