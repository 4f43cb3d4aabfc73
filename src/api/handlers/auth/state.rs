//! Auth configuration and shared handler state.

use argon2::Params;
use std::sync::Arc;

use super::otp::{LogOtpDelivery, OtpDelivery};

#[derive(Clone, Debug)]
pub struct AuthConfig {
    auto_verify: bool,
    hash_params: Params,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    /// Users are marked verified at registration and hashed with the Argon2 defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            auto_verify: true,
            hash_params: Params::default(),
        }
    }

    /// When disabled, new users start unverified and cannot log in until
    /// `/auth/verify-otp` succeeds.
    #[must_use]
    pub fn with_auto_verify(mut self, auto_verify: bool) -> Self {
        self.auto_verify = auto_verify;
        self
    }

    #[must_use]
    pub fn with_hash_params(mut self, params: Params) -> Self {
        self.hash_params = params;
        self
    }

    #[must_use]
    pub fn auto_verify(&self) -> bool {
        self.auto_verify
    }

    #[must_use]
    pub fn hash_params(&self) -> &Params {
        &self.hash_params
    }
}

/// Immutable state shared by the auth handlers.
#[derive(Clone, Debug)]
pub struct AuthState {
    config: AuthConfig,
    otp_delivery: Arc<dyn OtpDelivery>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, otp_delivery: Arc<dyn OtpDelivery>) -> Self {
        Self {
            config,
            otp_delivery,
        }
    }

    /// State that logs OTPs instead of sending them.
    #[must_use]
    pub fn with_log_delivery(config: AuthConfig) -> Self {
        Self::new(config, Arc::new(LogOtpDelivery))
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn otp_delivery(&self) -> &dyn OtpDelivery {
        self.otp_delivery.as_ref()
    }
}
