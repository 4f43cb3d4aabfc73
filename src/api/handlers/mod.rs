//! API handlers for the tenunku service.

pub mod auth;
pub mod health;
