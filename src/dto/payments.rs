use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Booking, Payment};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SavePaymentRequest {
    pub student_name: String,
    pub transaction_id: String,
    pub hostel_name: Option<String>,
    pub room_type: Option<String>,
    pub price: Option<i64>,
    pub payment_method: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    // Booking creation is attempted only when both of these are present.
    pub email: Option<String>,
    pub room_id: Option<Uuid>,
    pub check_in_date: Option<DateTime<Utc>>,
    pub check_out_date: Option<DateTime<Utc>>,
    pub number_of_guests: Option<i32>,
    pub special_requests: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SavePaymentResponse {
    pub payment: Payment,
    pub booking: Option<Booking>,
}
