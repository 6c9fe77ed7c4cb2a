//! Prody Common - Shared types and utilities
//!
//! This crate provides the foundational types used across all Prody components:
//! - Error taxonomy shared by services and the HTTP layer
//! - Utility functions (slugs, names, one-time credentials)

pub mod error;
pub mod utils;

// Re-exports for convenience
pub use error::ProdyError;
pub use utils::{full_name, generate_otp, generate_reset_token, slugify};

/// Role granted to the creator of an organization
pub const ROLE_ADMIN: &str = "admin";

/// Default role for a freshly signed-up user
pub const ROLE_MEMBER: &str = "member";

/// One-time verification code validity window in minutes
pub const OTP_EXPIRY_MINUTES: i64 = 10;

/// Password reset token validity window in minutes
pub const RESET_TOKEN_EXPIRY_MINUTES: i64 = 60;
