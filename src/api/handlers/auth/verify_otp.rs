use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error, instrument};

use super::{
    error_response, missing_payload, service,
    types::{ErrorResponse, MessageResponse, VerifyOtpRequest},
    AuthError,
};
use crate::storage::UserStore;

#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses (
        (status = 200, description = "Verification successful", body = MessageResponse, content_type = "application/json"),
        (status = 400, description = "Invalid OTP", body = ErrorResponse),
        (status = 500, description = "Error updating user", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn verify_otp(
    store: Extension<UserStore>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return missing_payload();
    };

    debug!(phone = ?request.phone, "verify otp");

    match service::verify_otp(&store, request).await {
        Ok(()) => Json(MessageResponse {
            message: "Verification successful".to_string(),
        })
        .into_response(),
        Err(AuthError::InvalidOtp) => error_response(StatusCode::BAD_REQUEST, "Invalid OTP"),
        Err(e) => {
            error!("Error updating user: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error updating user")
        }
    }
}
