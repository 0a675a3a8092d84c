use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::rooms::{
        CreateRoomRequest, RoomList, RoomWithBookings, RoomWithBookingsList, UpdateRoomRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Booking, Room, RoomStatus},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_rooms(state: &AppState) -> AppResult<ApiResponse<RoomList>> {
    let items: Vec<Room> = sqlx::query_as("SELECT * FROM rooms ORDER BY room_number")
        .fetch_all(&state.pool)
        .await?;
    Ok(ApiResponse::success(
        "Rooms",
        RoomList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_room(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Room>> {
    let room: Option<Room> = sqlx::query_as("SELECT * FROM rooms WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    match room {
        Some(room) => Ok(ApiResponse::success("Room", room, Some(Meta::empty()))),
        None => Err(AppError::NotFound),
    }
}

pub async fn create_room(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRoomRequest,
) -> AppResult<ApiResponse<Room>> {
    ensure_admin(user)?;
    if payload.capacity <= 0 {
        return Err(AppError::BadRequest("capacity must be positive".into()));
    }

    let room: Room = sqlx::query_as(
        r#"
        INSERT INTO rooms (id, room_number, room_type, capacity, price, amenities, description, images)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.room_number.trim())
    .bind(payload.room_type.trim())
    .bind(payload.capacity)
    .bind(payload.price)
    .bind(&payload.amenities)
    .bind(payload.description)
    .bind(&payload.images)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = audit::record(
        &state.pool,
        Some(user.user_id),
        AuditAction::RoomCreate,
        serde_json::json!({ "room_id": room.id }),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Room created", room, None))
}

pub async fn update_room(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRoomRequest,
) -> AppResult<ApiResponse<Room>> {
    ensure_admin(user)?;

    if let Some(status) = payload.status.as_deref() {
        if RoomStatus::parse(status).is_none() {
            return Err(AppError::BadRequest("Invalid room status".into()));
        }
    }
    if let Some(capacity) = payload.capacity {
        if capacity <= 0 {
            return Err(AppError::BadRequest("capacity must be positive".into()));
        }
    }

    let room: Option<Room> = sqlx::query_as(
        r#"
        UPDATE rooms SET
            room_number = COALESCE($1, room_number),
            room_type = COALESCE($2, room_type),
            capacity = COALESCE($3, capacity),
            price = COALESCE($4, price),
            status = COALESCE($5, status),
            amenities = COALESCE($6, amenities),
            description = COALESCE($7, description),
            images = COALESCE($8, images),
            updated_at = NOW()
        WHERE id = $9
        RETURNING *
        "#,
    )
    .bind(payload.room_number)
    .bind(payload.room_type)
    .bind(payload.capacity)
    .bind(payload.price)
    .bind(payload.status)
    .bind(payload.amenities)
    .bind(payload.description)
    .bind(payload.images)
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;

    match room {
        Some(room) => Ok(ApiResponse::success("Room updated", room, Some(Meta::empty()))),
        None => Err(AppError::NotFound),
    }
}

pub async fn delete_room(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = audit::record(
        &state.pool,
        Some(user.user_id),
        AuditAction::RoomDelete,
        serde_json::json!({ "room_id": id }),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::message("Room deleted"))
}

/// Admin room listing with each room's occupancy-active bookings attached.
pub async fn list_rooms_with_bookings(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RoomWithBookingsList>> {
    ensure_admin(user)?;

    let rooms: Vec<Room> = sqlx::query_as("SELECT * FROM rooms ORDER BY room_number")
        .fetch_all(&state.pool)
        .await?;

    let active: Vec<Booking> = sqlx::query_as(
        "SELECT * FROM bookings WHERE status IN ('confirmed', 'checked-in') AND room_id IS NOT NULL",
    )
    .fetch_all(&state.pool)
    .await?;

    let mut by_room: HashMap<Uuid, Vec<Booking>> = HashMap::new();
    for booking in active {
        if let Some(room_id) = booking.room_id {
            by_room.entry(room_id).or_default().push(booking);
        }
    }

    let items = rooms
        .into_iter()
        .map(|room| {
            let current_bookings = by_room.remove(&room.id).unwrap_or_default();
            RoomWithBookings {
                room,
                current_bookings,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "Rooms",
        RoomWithBookingsList { items },
        Some(Meta::empty()),
    ))
}
