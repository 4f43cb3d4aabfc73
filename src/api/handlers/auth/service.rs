//! Register, login and OTP verification against the user store.
//!
//! Nothing in here knows about HTTP. Each operation returns a typed outcome or
//! an [`AuthError`]; the handlers decide which status code each error maps to.

use thiserror::Error;
use tokio::task;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::otp::generate_otp;
use super::password::{hash_password, verify_password};
use super::state::AuthState;
use super::types::{LoginRequest, RegisterRequest, VerifyOtpRequest};
use crate::storage::{NewUser, StorageError, UserField, UserFilter, UserStore};

pub const MOCK_TOKEN_PREFIX: &str = "mock-token-";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Phone number already registered.
    #[error("user already exists")]
    Conflict,
    /// No user matches the supplied name, password and role.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Credentials matched but the account still needs OTP verification.
    #[error("account not verified")]
    NotVerified,
    /// Phone/OTP pair unknown, or the lookup failed.
    #[error("invalid otp")]
    InvalidOtp,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A freshly created user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub user_id: String,
    pub token: String,
}

/// A user whose credentials matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub user_id: String,
    pub token: String,
}

/// Placeholder token handed back to clients. It is not a credential and
/// nothing on the server ever checks it.
#[must_use]
pub fn mock_token(user_id: &str) -> String {
    format!("{MOCK_TOKEN_PREFIX}{user_id}")
}

/// Create a user with a fresh id and OTP, then hand the OTP to the delivery channel.
///
/// # Errors
/// `AuthError::Conflict` on a duplicate phone, `AuthError::Storage` or
/// `AuthError::Hash` for anything else.
pub async fn register(
    store: &UserStore,
    state: &AuthState,
    request: RegisterRequest,
) -> Result<Registered, AuthError> {
    let user_id = Uuid::new_v4().to_string();
    let otp = generate_otp();

    let password_hash = match request.password {
        Some(password) => {
            let params = state.config().hash_params().clone();
            let hash = task::spawn_blocking(move || hash_password(&password, &params))
                .await
                .map_err(|e| AuthError::Hash(e.to_string()))?
                .map_err(AuthError::Hash)?;
            Some(hash)
        }
        None => None,
    };

    let user = NewUser {
        id: user_id.clone(),
        full_name: request.full_name,
        phone: request.phone,
        email: request.email,
        password: password_hash,
        role: request.role,
        otp,
        is_verified: state.config().auto_verify(),
    };

    match store.insert(&user).await {
        Ok(()) => (),
        Err(StorageError::ConstraintViolation) => {
            debug!("phone already registered");
            return Err(AuthError::Conflict);
        }
        Err(e) => return Err(e.into()),
    }

    match user.phone.as_deref() {
        Some(phone) => {
            if let Err(e) = state.otp_delivery().deliver(phone, &user.otp) {
                // The row is already committed, so registration still succeeds.
                error!("failed to deliver OTP: {e:#}");
            }
        }
        None => warn!(user_id = %user_id, "no phone given, OTP not delivered"),
    }

    info!(user_id = %user_id, "user registered");

    Ok(Registered {
        token: mock_token(&user_id),
        user_id,
    })
}

/// Match `username` against registered full names with the same role.
///
/// Full names are not unique, so every candidate is checked and the oldest
/// account whose password verifies wins.
///
/// A missing name, password or role never matches anything.
///
/// # Errors
/// `AuthError::InvalidCredentials` when nothing matches, `AuthError::NotVerified`
/// when verification is required and pending, `AuthError::Storage` on query failure.
pub async fn login(
    store: &UserStore,
    state: &AuthState,
    request: LoginRequest,
) -> Result<Authenticated, AuthError> {
    let (Some(username), Some(password), Some(role)) =
        (request.username, request.password, request.role)
    else {
        return Err(AuthError::InvalidCredentials);
    };

    let candidates = store
        .find_all(
            &UserFilter::new()
                .eq(UserField::FullName, username)
                .eq(UserField::Role, role),
        )
        .await?;

    if candidates.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }

    let matched = task::spawn_blocking(move || {
        candidates.into_iter().find(|user| {
            user.password
                .as_deref()
                .is_some_and(|stored| verify_password(stored, &password))
        })
    })
    .await
    .map_err(|e| AuthError::Hash(e.to_string()))?;

    let Some(user) = matched else {
        return Err(AuthError::InvalidCredentials);
    };

    if !state.config().auto_verify() && !user.is_verified {
        warn!(user_id = %user.id, "login attempt on unverified account");
        return Err(AuthError::NotVerified);
    }

    Ok(Authenticated {
        token: mock_token(&user.id),
        user_id: user.id,
    })
}

/// Mark the user owning `phone` verified if `otp` is the code issued to it.
///
/// A missing phone or OTP never matches anything.
///
/// # Errors
/// `AuthError::InvalidOtp` when the pair is unknown or the lookup fails,
/// `AuthError::Storage` when the update fails.
pub async fn verify_otp(store: &UserStore, request: VerifyOtpRequest) -> Result<(), AuthError> {
    let (Some(phone), Some(otp)) = (request.phone, request.otp) else {
        return Err(AuthError::InvalidOtp);
    };

    let user = match store
        .find_one(
            &UserFilter::new()
                .eq(UserField::Phone, phone)
                .eq(UserField::Otp, otp),
        )
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => return Err(AuthError::InvalidOtp),
        Err(e) => {
            error!("OTP lookup failed: {e}");
            return Err(AuthError::InvalidOtp);
        }
    };

    store
        .update_field(&user.id, UserField::IsVerified, true)
        .await?;

    info!(user_id = %user.id, "user verified");

    Ok(())
}
