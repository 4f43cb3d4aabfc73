use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::{
    error_response, missing_payload, service,
    types::{AuthResponse, ErrorResponse, LoginRequest},
    AuthError, AuthState,
};
use crate::storage::UserStore;

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses (
        (status = 200, description = "Login successful", body = AuthResponse, content_type = "application/json"),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Account not verified (only when auto-verify is disabled)", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    store: Extension<UserStore>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return missing_payload();
    };

    debug!("login: {:?}", request);

    match service::login(&store, &state, request).await {
        Ok(authenticated) => Json(AuthResponse {
            message: "Login successful".to_string(),
            user_id: authenticated.user_id,
            token: authenticated.token,
        })
        .into_response(),
        Err(AuthError::InvalidCredentials) => {
            debug!("Invalid credentials");
            error_response(StatusCode::UNAUTHORIZED, "Invalid credentials")
        }
        Err(AuthError::NotVerified) => {
            error_response(StatusCode::FORBIDDEN, "Account not verified")
        }
        Err(e) => {
            error!("Error logging in: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
