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
    types::{AuthResponse, ErrorResponse, RegisterRequest},
    AuthError, AuthState,
};
use crate::storage::UserStore;

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses (
        (status = 200, description = "Registration successful", body = AuthResponse, content_type = "application/json"),
        (status = 400, description = "User already exists or other error", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    store: Extension<UserStore>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return missing_payload();
    };

    debug!("register: {:?}", request);

    match service::register(&store, &state, request).await {
        Ok(registered) => Json(AuthResponse {
            message: "Registration successful".to_string(),
            user_id: registered.user_id,
            token: registered.token,
        })
        .into_response(),
        Err(e) => {
            match &e {
                AuthError::Conflict => debug!("Registration conflict: {e}"),
                _ => error!("Error registering user: {e}"),
            }

            error_response(
                StatusCode::BAD_REQUEST,
                "User already exists or other error",
            )
        }
    }
}
