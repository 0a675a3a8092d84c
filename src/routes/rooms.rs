use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::rooms::RoomList,
    error::AppResult,
    models::Room,
    response::ApiResponse,
    services::room_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rooms))
        .route("/{id}", get(get_room))
}

#[utoipa::path(
    get,
    path = "/api/rooms",
    responses(
        (status = 200, description = "List all rooms", body = ApiResponse<RoomList>)
    ),
    tag = "Rooms"
)]
pub async fn list_rooms(State(state): State<AppState>) -> AppResult<Json<ApiResponse<RoomList>>> {
    let resp = room_service::list_rooms(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Get room", body = ApiResponse<Room>),
        (status = 404, description = "Not Found")
    ),
    tag = "Rooms"
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Room>>> {
    let resp = room_service::get_room(&state, id).await?;
    Ok(Json(resp))
}
