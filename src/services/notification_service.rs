use uuid::Uuid;

use crate::{
    dto::notifications::NotificationFeed,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Notification,
    response::{ApiResponse, Meta},
    state::AppState,
};

const ADMIN_TYPES: [&str; 2] = ["payment_submitted", "payment_received"];
const USER_TYPES: [&str; 3] = [
    "booking_confirmed",
    "booking_status_updated",
    "booking_cancelled",
];

/// Payment-related notifications for the admin bell. Intake writes them with
/// no admin assigned, so unassigned rows are visible to every admin.
pub async fn admin_feed(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<NotificationFeed>> {
    ensure_admin(user)?;

    let notifications: Vec<Notification> = sqlx::query_as(
        r#"
        SELECT * FROM notifications
        WHERE (admin_id = $1 OR admin_id IS NULL) AND type = ANY($2)
        ORDER BY created_at DESC
        LIMIT 50
        "#,
    )
    .bind(user.user_id)
    .bind(&ADMIN_TYPES[..])
    .fetch_all(&state.pool)
    .await?;

    let (unread_count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM notifications
        WHERE (admin_id = $1 OR admin_id IS NULL) AND is_read = FALSE AND type = ANY($2)
        "#,
    )
    .bind(user.user_id)
    .bind(&ADMIN_TYPES[..])
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Notifications",
        NotificationFeed {
            notifications,
            unread_count,
        },
        Some(Meta::empty()),
    ))
}

pub async fn user_feed(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<NotificationFeed>> {
    let notifications: Vec<Notification> = sqlx::query_as(
        r#"
        SELECT * FROM notifications
        WHERE user_id = $1 AND type = ANY($2)
        ORDER BY created_at DESC
        LIMIT 50
        "#,
    )
    .bind(user.user_id)
    .bind(&USER_TYPES[..])
    .fetch_all(&state.pool)
    .await?;

    let (unread_count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM notifications
        WHERE user_id = $1 AND is_read = FALSE AND type = ANY($2)
        "#,
    )
    .bind(user.user_id)
    .bind(&USER_TYPES[..])
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Notifications",
        NotificationFeed {
            notifications,
            unread_count,
        },
        Some(Meta::empty()),
    ))
}

pub async fn mark_read(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Notification>> {
    let updated: Option<Notification> = sqlx::query_as(
        "UPDATE notifications SET is_read = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;

    match updated {
        Some(updated) => Ok(ApiResponse::success(
            "Notification updated",
            updated,
            Some(Meta::empty()),
        )),
        None => Err(AppError::NotFound),
    }
}

pub async fn mark_all_read(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<()>> {
    sqlx::query(
        "UPDATE notifications SET is_read = TRUE, updated_at = NOW()
         WHERE user_id = $1 AND is_read = FALSE",
    )
    .bind(user.user_id)
    .execute(&state.pool)
    .await?;

    Ok(ApiResponse::message("All notifications marked as read"))
}

pub async fn delete_notification(state: &AppState, id: Uuid) -> AppResult<ApiResponse<()>> {
    let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::message("Notification deleted"))
}
