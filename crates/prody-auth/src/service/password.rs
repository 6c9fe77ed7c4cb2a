//! Password hashing

use prody_common::ProdyError;

/// bcrypt work factor used for all locally stored passwords
pub const BCRYPT_COST: u32 = 12;

pub fn hash_password(password: &str) -> Result<String, ProdyError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| ProdyError::Internal(format!("failed to hash password: {}", e)))
}

/// Compare a candidate password against a stored hash. Any bcrypt error
/// (malformed hash included) counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn test_verify_malformed_hash_is_false() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
        assert!(!verify_password("anything", ""));
    }
}
