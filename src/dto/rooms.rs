use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Booking, Room};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    pub room_number: String,
    pub room_type: String,
    pub capacity: i32,
    pub price: i64,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Partial update; omitted fields keep their current value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoomRequest {
    pub room_number: Option<String>,
    pub room_type: Option<String>,
    pub capacity: Option<i32>,
    pub price: Option<i64>,
    pub status: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomList {
    pub items: Vec<Room>,
}

/// Admin view: room plus its occupancy-active bookings.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomWithBookings {
    #[serde(flatten)]
    pub room: Room,
    pub current_bookings: Vec<Booking>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomWithBookingsList {
    pub items: Vec<RoomWithBookings>,
}
