//! HTTP error envelope
//!
//! Every error response shares one shape:
//! `{success:false, statusCode, message, timestamp, errorMsg?}`. The
//! optional `errorMsg` carries a machine-readable tag for client branching.

use std::fmt::{Display, Formatter};

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use prody_common::ProdyError;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<&'static str>,
}

impl ErrorEnvelope {
    pub fn new(status_code: u16, message: String, error_msg: Option<&'static str>) -> Self {
        Self {
            success: false,
            status_code,
            message,
            timestamp: chrono::Utc::now().to_rfc3339(),
            error_msg,
        }
    }
}

/// Wrapper turning service errors into envelope responses
#[derive(Debug)]
pub struct ApiError {
    inner: anyhow::Error,
}

impl ApiError {
    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }

    fn as_prody_error(&self) -> Option<&ProdyError> {
        self.inner.downcast_ref::<ProdyError>()
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        ApiError { inner: value }
    }
}

impl From<ProdyError> for ApiError {
    fn from(value: ProdyError) -> Self {
        ApiError {
            inner: value.into(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        let code = self
            .as_prody_error()
            .map(ProdyError::status_code)
            .unwrap_or(500);
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Internal details stay in the log, not in the response
        let (message, tag) = match self.as_prody_error() {
            Some(err) => (err.to_string(), err.error_tag()),
            None => {
                tracing::error!("unhandled error: {:#}", self.inner);
                ("Internal server error".to_string(), None)
            }
        };

        HttpResponse::build(status).json(ErrorEnvelope::new(status.as_u16(), message, tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prody_common::error::EMAIL_VERIFICATION_FAILED;

    #[test]
    fn test_status_mapping() {
        let err = ApiError::from(ProdyError::NotFound("Task not found".to_string()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = ApiError::from(ProdyError::Conflict("taken".to_string()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err = ApiError::from(anyhow::anyhow!("boom"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_envelope_shape() {
        let envelope = ErrorEnvelope::new(401, "Please verify your email first".to_string(), Some(EMAIL_VERIFICATION_FAILED));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["statusCode"], 401);
        assert_eq!(json["errorMsg"], EMAIL_VERIFICATION_FAILED);
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_envelope_omits_missing_tag() {
        let envelope = ErrorEnvelope::new(404, "missing".to_string(), None);
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("errorMsg").is_none());
    }

    #[test]
    fn test_wrapped_prody_error_downcast() {
        let err: anyhow::Error = ProdyError::InvalidInput("bad interval".to_string()).into();
        let api: ApiError = err.into();
        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(format!("{}", api), "bad interval");
    }
}
