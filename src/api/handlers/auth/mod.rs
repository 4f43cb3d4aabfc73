//! Registration, login and OTP verification endpoints.
//!
//! Flow:
//! - `POST /auth/register` stores the user, issues a 6 digit OTP and hands it to
//!   the configured [`OtpDelivery`] (logged by default).
//! - `POST /auth/login` matches full name + role, then checks the password hash.
//! - `POST /auth/verify-otp` flips `is_verified` for a matching phone/OTP pair.
//!
//! Wire errors are deliberately coarse (`{"error": "..."}`); [`AuthError`] keeps
//! the distinction internally.

pub mod login;
pub mod otp;
pub mod password;
pub mod register;
pub mod service;
pub mod state;
pub mod types;
pub mod verify_otp;


pub use otp::{LogOtpDelivery, OtpDelivery};
pub use service::{mock_token, AuthError};
pub use state::{AuthConfig, AuthState};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use types::ErrorResponse;

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

pub(crate) fn missing_payload() -> Response {
    error_response(StatusCode::BAD_REQUEST, "Missing payload")
}
