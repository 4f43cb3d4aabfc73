//! One-time password generation and delivery.

use anyhow::Result;
use rand::Rng;
use std::fmt::Debug;
use tracing::info;

const OTP_MIN: u32 = 100_000;
const OTP_MAX: u32 = 999_999;

/// Six digit numeric code, uniform over `100000..=999999`.
#[must_use]
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(OTP_MIN..=OTP_MAX).to_string()
}

/// Delivery channel for freshly issued codes (SMS, email, ...).
pub trait OtpDelivery: Send + Sync + Debug {
    /// Hand the code to the user or return an error to have it logged.
    ///
    /// # Errors
    /// Implementations return an error when the code could not be delivered.
    fn deliver(&self, phone: &str, otp: &str) -> Result<()>;
}

/// Local stand-in that writes the code to the log instead of sending it.
#[derive(Clone, Debug, Default)]
pub struct LogOtpDelivery;

impl OtpDelivery for LogOtpDelivery {
    fn deliver(&self, phone: &str, otp: &str) -> Result<()> {
        info!(phone = %phone, otp = %otp, "mock OTP generated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_otp_is_six_digits_in_range() {
        for _ in 0..1_000 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            let value: u32 = otp.parse().unwrap_or(0);
            assert!((OTP_MIN..=OTP_MAX).contains(&value), "out of range: {otp}");
        }
    }

    #[test]
    fn log_delivery_never_fails() {
        assert!(LogOtpDelivery.deliver("0811", "123456").is_ok());
    }
}
