use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::auth::{LoginRequest, LoginResponse},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::User,
    response::{ApiResponse, Meta},
    routes::admin::{DashboardStats, UpdateRoleRequest, UserList},
    services::auth_service,
    state::AppState,
};

const ALLOWED_ROLES: [&str; 5] = ["user", "admin", "student", "staff", "manager"];

/// Admin login: same credential check as a user login, but non-admin accounts
/// are rejected with the same error as bad credentials.
pub async fn login_admin(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user = auth_service::authenticate(state, &payload.email, &payload.password).await?;
    if !user.is_admin {
        return Err(AppError::Unauthorized);
    }

    let token = auth_service::issue_token(&user)?;

    if let Err(err) = audit::record(
        &state.pool,
        Some(user.id),
        AuditAction::AdminLogin,
        serde_json::json!({ "user_id": user.id }),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Login successful",
        LoginResponse {
            token,
            user: auth_service::public_user(&user),
        },
        Some(Meta::empty()),
    ))
}

pub async fn dashboard_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DashboardStats>> {
    ensure_admin(user)?;

    let (total_users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&state.pool)
        .await?;
    let (total_rooms,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rooms")
        .fetch_one(&state.pool)
        .await?;
    let (total_bookings,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings")
        .fetch_one(&state.pool)
        .await?;
    let (pending_bookings,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE status = 'pending'")
            .fetch_one(&state.pool)
            .await?;
    let (total_revenue,): (Option<i64>,) = sqlx::query_as(
        "SELECT SUM(total_price)::BIGINT FROM bookings WHERE payment_status = 'paid'",
    )
    .fetch_one(&state.pool)
    .await?;

    let stats = DashboardStats {
        total_users,
        total_rooms,
        total_bookings,
        pending_bookings,
        total_revenue: total_revenue.unwrap_or(0),
    };
    Ok(ApiResponse::success("Dashboard", stats, Some(Meta::empty())))
}

pub async fn list_users(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let items: Vec<User> = sqlx::query_as("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(&state.pool)
        .await?;
    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_user(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let found: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    match found {
        Some(found) => Ok(ApiResponse::success("User", found, Some(Meta::empty()))),
        None => Err(AppError::NotFound),
    }
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = audit::record(
        &state.pool,
        Some(user.user_id),
        AuditAction::UserDelete,
        serde_json::json!({ "user_id": id }),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::message("User deleted"))
}

pub async fn set_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    grant: bool,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let role = if grant { "admin" } else { "user" };

    let updated: Option<User> = sqlx::query_as(
        "UPDATE users SET is_admin = $1, role = $2 WHERE id = $3 RETURNING *",
    )
    .bind(grant)
    .bind(role)
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;
    let updated = match updated {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let action = if grant {
        AuditAction::UserMakeAdmin
    } else {
        AuditAction::UserRemoveAdmin
    };
    if let Err(err) = audit::record(
        &state.pool,
        Some(user.user_id),
        action,
        serde_json::json!({ "user_id": id }),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("User updated", updated, Some(Meta::empty())))
}

pub async fn update_role(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRoleRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    if !ALLOWED_ROLES.contains(&payload.role.as_str()) {
        return Err(AppError::BadRequest("Invalid role".into()));
    }

    let updated: Option<User> =
        sqlx::query_as("UPDATE users SET role = $1 WHERE id = $2 RETURNING *")
            .bind(payload.role.as_str())
            .bind(id)
            .fetch_optional(&state.pool)
            .await?;

    match updated {
        Some(updated) => Ok(ApiResponse::success(
            "User role updated successfully",
            updated,
            Some(Meta::empty()),
        )),
        None => Err(AppError::NotFound),
    }
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let found: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?;
    match found {
        Some(found) => Ok(ApiResponse::success("Profile", found, Some(Meta::empty()))),
        None => Err(AppError::NotFound),
    }
}
