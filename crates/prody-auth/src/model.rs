//! Authentication models
//!
//! Data structures for session credentials and token payloads.

use serde::{Deserialize, Serialize};

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

/// Default access token lifetime (30 minutes)
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 1800;
/// Default refresh token lifetime (7 days)
pub const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 604_800;
/// A refresh request is declined while the current access token still has
/// more than this much validity left
pub const REFRESH_THRESHOLD_SECONDS: i64 = 300;

/// JWT payload carried by both access and refresh tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Subject: user id
    pub sub: String,
    pub email: String,
    pub role: String,
    #[serde(rename = "orgId", default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    pub exp: i64,
}

/// Freshly minted access/refresh credential pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}
