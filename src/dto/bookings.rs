use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Booking, Room};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
}

/// Updated booking with its room after a status transition. `room` is absent
/// when the booking's room was deleted.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingWithRoom {
    pub booking: Booking,
    pub room: Option<Room>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentDetails {
    pub transaction_id: String,
    pub payment_method: String,
    pub payment_date: DateTime<Utc>,
}

/// Admin listing row: booking joined with guest/room context and the most
/// recent payment matching the booking's price and guest name.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminBooking {
    #[serde(flatten)]
    pub booking: Booking,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub room_number: Option<String>,
    pub room_type: Option<String>,
    pub payment_details: Option<PaymentDetails>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminBookingList {
    pub items: Vec<AdminBooking>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserBookingList {
    pub items: Vec<BookingWithRoom>,
}
