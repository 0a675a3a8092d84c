use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::payments::{SavePaymentRequest, SavePaymentResponse},
    error::{AppError, AppResult},
    models::{Booking, Payment, Room, User},
    notifier::ADMIN_CHANNEL,
    response::{ApiResponse, Meta},
    services::auth_service,
    state::AppState,
};

/// Record a self-reported payment and, when enough context is supplied, raise
/// a provisional booking for admin review.
///
/// The payment row is the operation of record. The booking branch — user
/// lookup/creation, room resolution, booking insert, admin notification — is
/// best-effort: any failure there is logged and the payment still succeeds.
/// Room occupancy is never touched here; it moves only when an admin later
/// updates the booking status.
pub async fn save_payment(
    state: &AppState,
    payload: SavePaymentRequest,
) -> AppResult<ApiResponse<SavePaymentResponse>> {
    if payload.student_name.trim().is_empty() || payload.transaction_id.trim().is_empty() {
        return Err(AppError::BadRequest(
            "studentName and transactionId are required".into(),
        ));
    }

    let exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM payments WHERE transaction_id = $1")
            .bind(payload.transaction_id.trim())
            .fetch_optional(&state.pool)
            .await?;
    if exists.is_some() {
        return Err(AppError::BadRequest(
            "Payment with this transaction ID already exists".into(),
        ));
    }

    let payment: Payment = sqlx::query_as(
        r#"
        INSERT INTO payments
            (id, student_name, hostel_name, room_type, price, payment_method, transaction_id, payment_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.student_name.trim())
    .bind(payload.hostel_name.as_deref().unwrap_or("RoomMatz"))
    .bind(payload.room_type.as_deref().unwrap_or("single"))
    .bind(payload.price.unwrap_or(0))
    .bind(payload.payment_method.as_deref().unwrap_or("Unknown"))
    .bind(payload.transaction_id.trim())
    .bind(payload.payment_date.unwrap_or_else(Utc::now))
    .fetch_one(&state.pool)
    .await?;

    let mut booking = None;
    if let (Some(email), Some(room_id)) = (payload.email.as_deref(), payload.room_id) {
        match create_provisional_booking(state, &payment, &payload, email, room_id).await {
            Ok(created) => booking = created,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    transaction_id = %payment.transaction_id,
                    "provisional booking creation failed"
                );
            }
        }
    }

    Ok(ApiResponse::success(
        "Payment saved successfully",
        SavePaymentResponse { payment, booking },
        Some(Meta::empty()),
    ))
}

async fn create_provisional_booking(
    state: &AppState,
    payment: &Payment,
    payload: &SavePaymentRequest,
    email: &str,
    room_id: Uuid,
) -> AppResult<Option<Booking>> {
    let user = find_or_create_user(state, &payload.student_name, email).await?;

    let room: Option<Room> = sqlx::query_as("SELECT * FROM rooms WHERE id = $1")
        .bind(room_id)
        .fetch_optional(&state.pool)
        .await?;
    let room = match room {
        Some(r) => r,
        None => {
            tracing::warn!(%room_id, "room not found, skipping booking creation");
            return Ok(None);
        }
    };

    let check_in = payload.check_in_date.unwrap_or_else(Utc::now);
    let check_out = payload
        .check_out_date
        .unwrap_or_else(|| Utc::now() + chrono::Duration::days(1));

    let booking: Booking = sqlx::query_as(
        r#"
        INSERT INTO bookings
            (id, user_id, room_id, check_in_date, check_out_date, total_price,
             guest_name, guest_email, guest_phone, number_of_guests, special_requests,
             status, payment_status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending', 'paid')
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(room.id)
    .bind(check_in)
    .bind(check_out)
    .bind(payload.price.unwrap_or(0))
    .bind(payload.student_name.trim())
    .bind(email)
    .bind("9876543210")
    .bind(payload.number_of_guests.unwrap_or(1))
    .bind(payload.special_requests.as_deref().unwrap_or(""))
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = notify_admins(state, payment, &booking).await {
        tracing::warn!(error = %err, "admin notification failed");
    }

    tracing::info!(
        booking_id = %booking.id,
        user_id = %user.id,
        room_id = %room.id,
        "provisional booking created"
    );
    Ok(Some(booking))
}

async fn find_or_create_user(state: &AppState, name: &str, email: &str) -> AppResult<User> {
    let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(&state.pool)
        .await?;
    if let Some(user) = existing {
        return Ok(user);
    }

    // Guest checkout: the account gets a throwaway password until the user
    // claims it through the reset flow.
    let password_hash = auth_service::hash_password(&Uuid::new_v4().to_string())?;
    let user: User = sqlx::query_as(
        "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(name.trim())
    .bind(email)
    .bind(password_hash)
    .fetch_one(&state.pool)
    .await?;

    Ok(user)
}

async fn notify_admins(state: &AppState, payment: &Payment, booking: &Booking) -> AppResult<()> {
    let title = "New Payment Received";
    let message = format!(
        "Payment of {} received from {} for {} room. Transaction ID: {}",
        payment.price, payment.student_name, payment.room_type, payment.transaction_id
    );

    sqlx::query(
        r#"
        INSERT INTO notifications (id, booking_id, payment_id, type, title, message)
        VALUES ($1, $2, $3, 'payment_submitted', $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(booking.id)
    .bind(payment.id)
    .bind(title)
    .bind(message.as_str())
    .execute(&state.pool)
    .await?;

    state.notifier.publish(
        ADMIN_CHANNEL,
        "admin-notification",
        serde_json::json!({
            "type": "payment_submitted",
            "title": title,
            "message": message,
            "bookingId": booking.id,
            "paymentId": payment.id,
            "createdAt": Utc::now(),
        }),
    );

    Ok(())
}
