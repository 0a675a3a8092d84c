use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::payments::{SavePaymentRequest, SavePaymentResponse},
    error::AppResult,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/save-payment", post(save_payment))
}

#[utoipa::path(
    post,
    path = "/api/payments/save-payment",
    request_body = SavePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded, booking optionally created", body = ApiResponse<SavePaymentResponse>),
        (status = 400, description = "Missing fields or duplicate transaction ID")
    ),
    tag = "Payments"
)]
pub async fn save_payment(
    State(state): State<AppState>,
    Json(payload): Json<SavePaymentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SavePaymentResponse>>)> {
    let resp = payment_service::save_payment(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
