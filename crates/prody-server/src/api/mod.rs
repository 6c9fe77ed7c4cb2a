//! HTTP and WebSocket handlers
//!
//! One module per resource, each exposing a `routes()` scope. Handlers stay
//! thin: authenticate -> authorize -> parse -> delegate to a service.

pub mod activity_logs;
pub mod analytics;
pub mod auth;
pub mod meetings;
pub mod notifications;
pub mod organizations;
pub mod tasks;
pub mod ws;

use prody_common::ProdyError;
use validator::Validate;

use crate::model::ApiError;

/// Run DTO validation, mapping failures onto the InvalidInput envelope.
pub(crate) fn validate<T: Validate>(dto: &T) -> Result<(), ApiError> {
    dto.validate()
        .map_err(|e| ApiError::from(ProdyError::InvalidInput(e.to_string())))
}

/// Parse an ISO 8601 timestamp from a request body or query string.
pub(crate) fn parse_datetime(
    value: &str,
    field: &str,
) -> Result<chrono::DateTime<chrono::Utc>, ApiError> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&chrono::Utc))
        .map_err(|_| {
            ApiError::from(ProdyError::InvalidInput(format!(
                "{} must be an ISO 8601 date string",
                field
            )))
        })
}

pub(crate) fn parse_datetime_opt(
    value: Option<&str>,
    field: &str,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, ApiError> {
    value.map(|v| parse_datetime(v, field)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime() {
        let parsed = parse_datetime("2026-03-10T10:00:00Z", "startTime").unwrap();
        assert_eq!(parsed.timestamp(), 1773136800);
        assert!(parse_datetime("10-03-2026", "startTime").is_err());
    }

    #[test]
    fn test_parse_datetime_opt() {
        assert!(parse_datetime_opt(None, "from").unwrap().is_none());
        assert!(parse_datetime_opt(Some("bogus"), "from").is_err());
    }
}
