use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::sse::{Event, Sse},
    routing::{delete, get, put},
};
use serde::Deserialize;
use tokio_stream::wrappers::{BroadcastStream, IntervalStream};
use tokio_stream::StreamExt;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::notifications::NotificationFeed,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, decode_token, ensure_admin},
    models::Notification,
    notifier::{ADMIN_CHANNEL, user_channel},
    response::ApiResponse,
    services::notification_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin_feed))
        .route("/user", get(user_feed))
        .route("/user/read-all", put(mark_all_read))
        .route("/{id}/read", put(mark_read))
        .route("/{id}", delete(delete_notification))
        .route("/stream", get(event_stream))
}

#[utoipa::path(
    get,
    path = "/api/notifications/admin",
    responses(
        (status = 200, description = "Admin payment notifications with unread count", body = ApiResponse<NotificationFeed>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn admin_feed(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<NotificationFeed>>> {
    let resp = notification_service::admin_feed(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/notifications/user",
    responses(
        (status = 200, description = "User booking notifications with unread count", body = ApiResponse<NotificationFeed>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn user_feed(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<NotificationFeed>>> {
    let resp = notification_service::user_feed(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked read", body = ApiResponse<Notification>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let resp = notification_service::mark_read(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/notifications/user/read-all",
    responses(
        (status = 200, description = "All notifications marked read"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = notification_service::mark_all_read(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification deleted"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = notification_service::delete_notification(&state, id).await?;
    Ok(Json(resp))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StreamQuery {
    pub token: Option<String>,
    /// Pass `admin` to subscribe to the admin channel (admins only).
    pub channel: Option<String>,
}

/// SSE stream of realtime notifications for the caller's channel.
/// Auth comes in as a query parameter because EventSource cannot set headers.
pub async fn event_stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    let token = query.token.as_deref().unwrap_or("");
    let user = decode_token(token)?;

    let channel = match query.channel.as_deref() {
        Some("admin") => {
            ensure_admin(&user)?;
            ADMIN_CHANNEL.to_string()
        }
        _ => user_channel(user.user_id),
    };

    let rx = state.notifier.subscribe();
    let live = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(push) if push.channel == channel => {
            let data = serde_json::to_string(&push.payload).unwrap_or_default();
            Some(Ok::<_, Infallible>(Event::default().data(data).event(push.event)))
        }
        Ok(_) => None,
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(_)) => None,
    });

    let keepalive = tokio_stream::StreamExt::map(
        IntervalStream::new(tokio::time::interval(Duration::from_secs(30))),
        |_| Ok(Event::default().comment("keepalive")),
    );

    Ok(Sse::new(StreamExt::merge(live, keepalive)))
}
