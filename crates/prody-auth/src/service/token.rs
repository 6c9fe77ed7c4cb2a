//! JWT token service

use std::sync::LazyLock;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use moka::sync::Cache;

use crate::model::{AuthClaims, TokenPair};

/// JWT token cache to avoid repeated validation of the same token
static TOKEN_CACHE: LazyLock<Cache<String, AuthClaims>> = LazyLock::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(300)) // 5 minutes TTL
        .build()
});

/// Signs and verifies the access/refresh credential pair.
///
/// Both token kinds carry the same [`AuthClaims`] payload; they differ only
/// in lifetime.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TokenService {
    pub fn new(secret: String, access_ttl_seconds: i64, refresh_ttl_seconds: i64) -> Self {
        Self {
            secret,
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    /// Mint an access/refresh pair for the given subject.
    pub fn issue(
        &self,
        sub: &str,
        email: &str,
        role: &str,
        org_id: Option<&str>,
    ) -> jsonwebtoken::errors::Result<TokenPair> {
        let access_token = self.encode(sub, email, role, org_id, self.access_ttl_seconds)?;
        let refresh_token = self.encode(sub, email, role, org_id, self.refresh_ttl_seconds)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_ttl_seconds,
        })
    }

    fn encode(
        &self,
        sub: &str,
        email: &str,
        role: &str,
        org_id: Option<&str>,
        expire_seconds: i64,
    ) -> jsonwebtoken::errors::Result<String> {
        let exp = chrono::Utc::now()
            .checked_add_signed(chrono::Duration::seconds(expire_seconds))
            .unwrap_or_else(chrono::Utc::now)
            .timestamp();

        let payload = AuthClaims {
            sub: sub.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            org_id: org_id.map(str::to_string),
            exp,
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), &payload, &encoding_key)
    }

    /// Decode and validate a token without caching.
    pub fn decode(&self, token: &str) -> jsonwebtoken::errors::Result<AuthClaims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        decode::<AuthClaims>(token, &decoding_key, &Validation::default()).map(|data| data.claims)
    }

    /// Decode and validate a token with caching.
    pub fn decode_cached(&self, token: &str) -> jsonwebtoken::errors::Result<AuthClaims> {
        // Check cache first - use token directly for lookup
        if let Some(claims) = TOKEN_CACHE.get(token) {
            let now = chrono::Utc::now().timestamp();
            if claims.exp > now {
                return Ok(claims);
            }
            // Token expired in cache, invalidate it
            TOKEN_CACHE.invalidate(token);
        }

        let claims = self.decode(token)?;
        TOKEN_CACHE.insert(token.to_string(), claims.clone());

        Ok(claims)
    }

    /// Remaining validity of a token in seconds, without verifying the
    /// signature. Used for the "no refresh needed" threshold check, where an
    /// undecodable token simply means the caller should refresh.
    pub fn remaining_validity_seconds(token: &str) -> Option<i64> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;

        let claims = decode::<AuthClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .ok()?
            .claims;

        Some(claims.exp - chrono::Utc::now().timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::REFRESH_THRESHOLD_SECONDS;

    fn service() -> TokenService {
        TokenService::new("test-secret".to_string(), 1800, 604_800)
    }

    #[test]
    fn test_issue_and_decode_round_trip() {
        let svc = service();
        let pair = svc
            .issue("user-1", "ada@example.com", "member", Some("org-1"))
            .unwrap();

        let claims = svc.decode(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, "member");
        assert_eq!(claims.org_id.as_deref(), Some("org-1"));
        assert_eq!(pair.expires_in, 1800);

        // Refresh token carries the same payload
        let refresh_claims = svc.decode(&pair.refresh_token).unwrap();
        assert_eq!(refresh_claims.sub, "user-1");
        assert!(refresh_claims.exp > claims.exp);
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let pair = service().issue("user-1", "a@b.c", "member", None).unwrap();
        let other = TokenService::new("other-secret".to_string(), 1800, 604_800);
        assert!(other.decode(&pair.access_token).is_err());
    }

    #[test]
    fn test_org_id_absent_when_user_has_no_org() {
        let svc = service();
        let pair = svc.issue("user-1", "a@b.c", "member", None).unwrap();
        let claims = svc.decode(&pair.access_token).unwrap();
        assert!(claims.org_id.is_none());
    }

    #[test]
    fn test_decode_cached_matches_uncached() {
        let svc = service();
        let pair = svc.issue("user-2", "b@c.d", "admin", None).unwrap();
        let direct = svc.decode(&pair.access_token).unwrap();
        let cached = svc.decode_cached(&pair.access_token).unwrap();
        let cached_again = svc.decode_cached(&pair.access_token).unwrap();
        assert_eq!(direct, cached);
        assert_eq!(cached, cached_again);
    }

    #[test]
    fn test_remaining_validity_above_refresh_threshold() {
        let svc = service();
        let pair = svc.issue("user-1", "a@b.c", "member", None).unwrap();
        let remaining = TokenService::remaining_validity_seconds(&pair.access_token).unwrap();
        assert!(remaining > REFRESH_THRESHOLD_SECONDS);
        assert!(remaining <= 1800);
    }

    #[test]
    fn test_remaining_validity_garbage_token() {
        assert!(TokenService::remaining_validity_seconds("not-a-jwt").is_none());
    }
}
