//! Error types for Prody
//!
//! This module defines `ProdyError`, the application-specific error enum.
//! Every service returns it; the HTTP layer maps each variant onto a status
//! code and the shared error envelope.

/// Machine-readable tag attached to a subset of auth failures so clients can
/// branch without parsing messages.
pub const EMAIL_VERIFICATION_FAILED: &str = "EMAIL_VERIFICATION_FAILED";

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum ProdyError {
    #[error("{0}")]
    Unauthenticated(String),

    /// Unauthenticated with a machine-readable tag for client branching
    #[error("{message}")]
    UnauthenticatedTagged { message: String, tag: &'static str },

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("dependency failure: {0}")]
    DependencyFailure(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ProdyError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ProdyError::Unauthenticated(_) | ProdyError::UnauthenticatedTagged { .. } => 401,
            ProdyError::Forbidden(_) => 403,
            ProdyError::NotFound(_) => 404,
            ProdyError::Conflict(_) => 409,
            ProdyError::InvalidInput(_) => 400,
            ProdyError::DependencyFailure(_) => 502,
            ProdyError::Database(_) | ProdyError::Internal(_) => 500,
        }
    }

    /// Machine-readable tag, if this error carries one
    pub fn error_tag(&self) -> Option<&'static str> {
        match self {
            ProdyError::UnauthenticatedTagged { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Shorthand for the tagged "verify your email first" rejection
    pub fn email_not_verified() -> Self {
        ProdyError::UnauthenticatedTagged {
            message: "Please verify your email first".to_string(),
            tag: EMAIL_VERIFICATION_FAILED,
        }
    }
}

impl From<anyhow::Error> for ProdyError {
    fn from(value: anyhow::Error) -> Self {
        ProdyError::Internal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProdyError::Unauthenticated("Invalid credentials".to_string());
        assert_eq!(format!("{}", err), "Invalid credentials");

        let err = ProdyError::DependencyFailure("mail provider timeout".to_string());
        assert_eq!(format!("{}", err), "dependency failure: mail provider timeout");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ProdyError::Unauthenticated(String::new()).status_code(), 401);
        assert_eq!(ProdyError::Forbidden(String::new()).status_code(), 403);
        assert_eq!(ProdyError::NotFound(String::new()).status_code(), 404);
        assert_eq!(ProdyError::Conflict(String::new()).status_code(), 409);
        assert_eq!(ProdyError::InvalidInput(String::new()).status_code(), 400);
        assert_eq!(ProdyError::DependencyFailure(String::new()).status_code(), 502);
        assert_eq!(ProdyError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_email_not_verified_tag() {
        let err = ProdyError::email_not_verified();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.error_tag(), Some(EMAIL_VERIFICATION_FAILED));
        assert_eq!(format!("{}", err), "Please verify your email first");
    }

    #[test]
    fn test_untagged_errors_have_no_tag() {
        assert!(ProdyError::Conflict("taken".to_string()).error_tag().is_none());
    }
}
