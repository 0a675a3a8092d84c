use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

/// Actions worth an audit trail row. Each knows the table it concerns.
#[derive(Debug, Clone, Copy)]
pub enum AuditAction {
    UserRegister,
    UserLogin,
    AdminLogin,
    UserDelete,
    UserMakeAdmin,
    UserRemoveAdmin,
    RoomCreate,
    RoomDelete,
    BookingStatusUpdate,
    BookingDelete,
}

impl AuditAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::UserRegister => "user_register",
            Self::UserLogin => "user_login",
            Self::AdminLogin => "admin_login",
            Self::UserDelete => "user_delete",
            Self::UserMakeAdmin => "user_make_admin",
            Self::UserRemoveAdmin => "user_remove_admin",
            Self::RoomCreate => "room_create",
            Self::RoomDelete => "room_delete",
            Self::BookingStatusUpdate => "booking_status_update",
            Self::BookingDelete => "booking_delete",
        }
    }

    fn resource(self) -> &'static str {
        match self {
            Self::UserRegister
            | Self::UserLogin
            | Self::AdminLogin
            | Self::UserDelete
            | Self::UserMakeAdmin
            | Self::UserRemoveAdmin => "users",
            Self::RoomCreate | Self::RoomDelete => "rooms",
            Self::BookingStatusUpdate | Self::BookingDelete => "bookings",
        }
    }
}

pub async fn record(
    pool: &DbPool,
    actor: Option<Uuid>,
    action: AuditAction,
    detail: Value,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(actor)
    .bind(action.as_str())
    .bind(action.resource())
    .bind(detail)
    .execute(pool)
    .await?;

    Ok(())
}
