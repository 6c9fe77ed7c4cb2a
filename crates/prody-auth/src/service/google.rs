//! Google id-token verification
//!
//! Validates the id token a frontend obtained from Google sign-in and maps
//! the claims into a local profile. Verification goes through Google's
//! tokeninfo endpoint, which checks the signature server-side; we check the
//! audience and expiry here.

use prody_common::ProdyError;
use serde::Deserialize;
use tracing::warn;

const TOKENINFO_ENDPOINT: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Claims returned by the tokeninfo endpoint (subset we consume)
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenInfo {
    pub aud: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    /// Expiry as a unix timestamp; Google serializes it as a string
    #[serde(default)]
    pub exp: Option<String>,
}

/// Profile extracted from a verified Google identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleProfile {
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}

pub struct GoogleVerifier {
    client_id: String,
    http_client: reqwest::Client,
}

impl GoogleVerifier {
    pub fn new(client_id: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client_id,
            http_client,
        }
    }

    /// Verify an id token and return the holder's profile.
    pub async fn verify_id_token(&self, id_token: &str) -> Result<GoogleProfile, ProdyError> {
        let response = self
            .http_client
            .get(TOKENINFO_ENDPOINT)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| {
                warn!("tokeninfo request failed: {}", e);
                ProdyError::Unauthenticated("Google authentication failed".to_string())
            })?;

        if !response.status().is_success() {
            return Err(ProdyError::Unauthenticated(
                "Google authentication failed".to_string(),
            ));
        }

        let info: GoogleTokenInfo = response.json().await.map_err(|e| {
            warn!("tokeninfo payload unreadable: {}", e);
            ProdyError::Unauthenticated("Google authentication failed".to_string())
        })?;

        profile_from_claims(info, &self.client_id)
    }
}

/// Audience/expiry checks and claim mapping, split out from the HTTP call.
fn profile_from_claims(
    info: GoogleTokenInfo,
    client_id: &str,
) -> Result<GoogleProfile, ProdyError> {
    if info.aud != client_id {
        return Err(ProdyError::Unauthenticated(
            "Google authentication failed".to_string(),
        ));
    }

    if let Some(exp) = info.exp.as_deref().and_then(|v| v.parse::<i64>().ok())
        && exp < chrono::Utc::now().timestamp()
    {
        return Err(ProdyError::Unauthenticated(
            "Google authentication failed".to_string(),
        ));
    }

    let email = info.email.filter(|e| !e.is_empty()).ok_or_else(|| {
        ProdyError::Unauthenticated("Invalid Google token payload".to_string())
    })?;

    Ok(GoogleProfile {
        email,
        first_name: info.given_name.unwrap_or_else(|| "User".to_string()),
        last_name: info.family_name,
        avatar_url: info.picture,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(aud: &str, email: Option<&str>) -> GoogleTokenInfo {
        GoogleTokenInfo {
            aud: aud.to_string(),
            email: email.map(str::to_string),
            given_name: Some("Ada".to_string()),
            family_name: Some("Lovelace".to_string()),
            picture: Some("https://example.com/a.png".to_string()),
            exp: Some((chrono::Utc::now().timestamp() + 600).to_string()),
        }
    }

    #[test]
    fn test_profile_mapping() {
        let profile = profile_from_claims(claims("client-1", Some("ada@example.com")), "client-1")
            .unwrap();
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.last_name.as_deref(), Some("Lovelace"));
    }

    #[test]
    fn test_audience_mismatch_rejected() {
        let result = profile_from_claims(claims("other-client", Some("a@b.c")), "client-1");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_email_rejected() {
        let result = profile_from_claims(claims("client-1", None), "client-1");
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut info = claims("client-1", Some("a@b.c"));
        info.exp = Some((chrono::Utc::now().timestamp() - 60).to_string());
        assert!(profile_from_claims(info, "client-1").is_err());
    }

    #[test]
    fn test_missing_given_name_defaults() {
        let mut info = claims("client-1", Some("a@b.c"));
        info.given_name = None;
        let profile = profile_from_claims(info, "client-1").unwrap();
        assert_eq!(profile.first_name, "User");
    }
}
