//! Utility functions for Prody
//!
//! Common helper functions used across the codebase.

use rand::Rng;

/// Build a URL-friendly slug from an organization name.
///
/// Lowercases, turns spaces into hyphens, and strips every remaining
/// character outside `[a-z0-9_-]`, e.g. `"My Company"` -> `"my-company"`.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Assemble a display name from first and optional last name.
pub fn full_name(first_name: &str, last_name: Option<&str>) -> String {
    match last_name {
        Some(last) if !last.is_empty() => format!("{} {}", first_name, last),
        _ => first_name.to_string(),
    }
}

/// Generate a 6-digit one-time verification code.
pub fn generate_otp() -> String {
    let mut rng = rand::rng();
    rng.random_range(100_000..1_000_000).to_string()
}

/// Generate a single-use password reset token (32 random bytes, hex encoded).
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    const_hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My Company"), "my-company");
        assert_eq!(slugify("Acme, Inc."), "acme-inc");
        assert_eq!(slugify("  spaced  out  "), "--spaced--out--");
        assert_eq!(slugify("Already-Sluggy_1"), "already-sluggy_1");
    }

    #[test]
    fn test_full_name() {
        assert_eq!(full_name("Ada", Some("Lovelace")), "Ada Lovelace");
        assert_eq!(full_name("Ada", None), "Ada");
        assert_eq!(full_name("Ada", Some("")), "Ada");
    }

    #[test]
    fn test_generate_otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_reset_token() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
