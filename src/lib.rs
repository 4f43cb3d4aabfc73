//! # Tenunku (registration, login and OTP verification)
//!
//! `tenunku` is a small authentication backend over a single SQLite table.
//!
//! - `POST /auth/register` creates a user and issues a 6 digit OTP.
//! - `POST /auth/login` matches full name, role and password.
//! - `POST /auth/verify-otp` marks the user owning a phone/OTP pair verified.
//!
//! Passwords are stored as Argon2id hashes. The `token` returned by register and
//! login is a placeholder (`mock-token-<id>`), not a credential; no endpoint
//! checks it.

pub mod api;
pub mod cli;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
