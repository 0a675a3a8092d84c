use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::bookings::{
        AdminBooking, AdminBookingList, BookingWithRoom, PaymentDetails, UpdateBookingStatusRequest,
        UserBookingList,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{
        Booking, BookingStatus, Room, RoomStatus, apply_room_transition, occupancy_delta,
    },
    notifier::user_channel,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Move a booking to an admin-requested status and keep its room consistent.
///
/// The booking and room writes share one transaction with row locks, so
/// concurrent admin actions on the same room cannot lose an occupancy update.
/// A booking whose room has been deleted still transitions; the room side is
/// skipped. The user notification (persisted + pushed) and the audit entry run
/// after commit and never fail the operation.
pub async fn update_booking_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBookingStatusRequest,
) -> AppResult<ApiResponse<BookingWithRoom>> {
    ensure_admin(user)?;
    let new_status = BookingStatus::parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest("Invalid booking status".into()))?;

    let mut txn = state.pool.begin().await?;

    let booking: Option<Booking> = sqlx::query_as("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *txn)
        .await?;
    let booking = match booking {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };
    // Stored statuses are only ever written from BookingStatus::as_str.
    let old_status = BookingStatus::parse(&booking.status).unwrap_or(BookingStatus::Pending);

    let booking: Booking = sqlx::query_as(
        "UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(new_status.as_str())
    .bind(id)
    .fetch_one(&mut *txn)
    .await?;

    let mut room: Option<Room> = None;
    if let Some(room_id) = booking.room_id {
        let current: Option<Room> = sqlx::query_as("SELECT * FROM rooms WHERE id = $1 FOR UPDATE")
            .bind(room_id)
            .fetch_optional(&mut *txn)
            .await?;
        if let Some(current) = current {
            let delta = occupancy_delta(old_status, new_status);
            if delta != 0 {
                let current_status =
                    RoomStatus::parse(&current.status).unwrap_or(RoomStatus::Available);
                let (occupancy, status) =
                    apply_room_transition(current.occupancy, current.capacity, current_status, delta);
                let updated: Room = sqlx::query_as(
                    "UPDATE rooms SET occupancy = $1, status = $2, updated_at = NOW()
                     WHERE id = $3 RETURNING *",
                )
                .bind(occupancy)
                .bind(status.as_str())
                .bind(room_id)
                .fetch_one(&mut *txn)
                .await?;
                tracing::info!(
                    room_number = %updated.room_number,
                    occupancy = updated.occupancy,
                    capacity = updated.capacity,
                    status = %updated.status,
                    "room occupancy updated"
                );
                room = Some(updated);
            } else {
                room = Some(current);
            }
        }
    }

    txn.commit().await?;

    if let Err(err) = notify_status_change(state, &booking, room.as_ref(), new_status).await {
        tracing::warn!(error = %err, booking_id = %booking.id, "booking notification failed");
    }

    if let Err(err) = audit::record(
        &state.pool,
        Some(user.user_id),
        AuditAction::BookingStatusUpdate,
        serde_json::json!({ "booking_id": booking.id, "status": booking.status }),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Booking updated",
        BookingWithRoom { booking, room },
        Some(Meta::empty()),
    ))
}

/// Delete a booking. The room goes straight back to `available`: deletion is a
/// manual override and deliberately does not consult the occupancy counter.
pub async fn delete_booking(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;

    let mut txn = state.pool.begin().await?;

    let booking: Option<Booking> =
        sqlx::query_as("DELETE FROM bookings WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut *txn)
            .await?;
    let booking = match booking {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };

    if let Some(room_id) = booking.room_id {
        sqlx::query("UPDATE rooms SET status = 'available', updated_at = NOW() WHERE id = $1")
            .bind(room_id)
            .execute(&mut *txn)
            .await?;
    }

    txn.commit().await?;

    if let Err(err) = audit::record(
        &state.pool,
        Some(user.user_id),
        AuditAction::BookingDelete,
        serde_json::json!({ "booking_id": id }),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::message("Booking deleted"))
}

#[derive(sqlx::FromRow)]
struct AdminBookingRow {
    #[sqlx(flatten)]
    booking: Booking,
    user_name: Option<String>,
    user_email: Option<String>,
    room_number: Option<String>,
    room_type: Option<String>,
    transaction_id: Option<String>,
    payment_method: Option<String>,
    payment_date: Option<DateTime<Utc>>,
}

/// All bookings for the admin dashboard: pending surfaces with the status
/// ordering, newest first within a status, and the most recent payment
/// matching the booking's price and guest name attached when one exists.
pub async fn list_admin_bookings(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AdminBookingList>> {
    ensure_admin(user)?;

    let rows: Vec<AdminBookingRow> = sqlx::query_as(
        r#"
        SELECT b.*,
               u.name AS user_name,
               u.email AS user_email,
               r.room_number,
               r.room_type AS room_type,
               p.transaction_id,
               p.payment_method,
               p.payment_date
        FROM bookings b
        LEFT JOIN users u ON u.id = b.user_id
        LEFT JOIN rooms r ON r.id = b.room_id
        LEFT JOIN LATERAL (
            SELECT transaction_id, payment_method, payment_date
            FROM payments
            WHERE price = b.total_price AND student_name = b.guest_name
            ORDER BY payment_date DESC
            LIMIT 1
        ) p ON TRUE
        ORDER BY b.status ASC, b.created_at DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| {
            let payment_details = match (row.transaction_id, row.payment_method, row.payment_date)
            {
                (Some(transaction_id), Some(payment_method), Some(payment_date)) => {
                    Some(PaymentDetails {
                        transaction_id,
                        payment_method,
                        payment_date,
                    })
                }
                _ => None,
            };
            AdminBooking {
                booking: row.booking,
                user_name: row.user_name,
                user_email: row.user_email,
                room_number: row.room_number,
                room_type: row.room_type,
                payment_details,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "Bookings",
        AdminBookingList { items },
        Some(Meta::empty()),
    ))
}

/// The caller's own bookings, newest first, with rooms populated.
pub async fn list_user_bookings(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<UserBookingList>> {
    let bookings: Vec<Booking> = sqlx::query_as(
        "SELECT * FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let room_ids: Vec<Uuid> = bookings.iter().filter_map(|b| b.room_id).collect();
    let rooms: Vec<Room> = sqlx::query_as("SELECT * FROM rooms WHERE id = ANY($1)")
        .bind(&room_ids)
        .fetch_all(&state.pool)
        .await?;
    let rooms: HashMap<Uuid, Room> = rooms.into_iter().map(|r| (r.id, r)).collect();

    let items = bookings
        .into_iter()
        .map(|booking| {
            let room = booking.room_id.and_then(|id| rooms.get(&id).cloned());
            BookingWithRoom { booking, room }
        })
        .collect();

    Ok(ApiResponse::success(
        "Bookings",
        UserBookingList { items },
        Some(Meta::empty()),
    ))
}

/// Persist and push the user-facing notification for a status change.
async fn notify_status_change(
    state: &AppState,
    booking: &Booking,
    room: Option<&Room>,
    status: BookingStatus,
) -> AppResult<()> {
    let room_number = room.map(|r| r.room_number.as_str()).unwrap_or("-");
    let (title, message) = match status {
        BookingStatus::Confirmed => (
            "Booking Confirmed!",
            format!(
                "Your booking for room {room_number} has been confirmed. Check-in: {}",
                booking.check_in_date.format("%Y-%m-%d")
            ),
        ),
        BookingStatus::CheckedIn => (
            "Checked In Successfully",
            format!("You have been checked in to room {room_number}. Enjoy your stay!"),
        ),
        BookingStatus::CheckedOut => (
            "Checkout Completed",
            format!(
                "Your checkout from room {room_number} has been completed. Thank you for staying with us!"
            ),
        ),
        BookingStatus::Cancelled => (
            "Booking Cancelled",
            format!("Your booking for room {room_number} has been cancelled."),
        ),
        BookingStatus::Pending => (
            "Booking Pending",
            "Your booking is under review. We will notify you once it's confirmed.".to_string(),
        ),
    };

    let kind = if status == BookingStatus::Confirmed {
        "booking_confirmed"
    } else {
        "booking_status_updated"
    };

    let created_at = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO notifications (id, user_id, booking_id, type, title, message)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(booking.user_id)
    .bind(booking.id)
    .bind(kind)
    .bind(title)
    .bind(message.as_str())
    .execute(&state.pool)
    .await?;

    state.notifier.publish(
        &user_channel(booking.user_id),
        "user-notification",
        serde_json::json!({
            "userId": booking.user_id,
            "type": kind,
            "title": title,
            "message": message,
            "bookingId": booking.id,
            "createdAt": created_at,
        }),
    );

    Ok(())
}
