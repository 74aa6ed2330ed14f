//! Webhook error types for Stripe webhook handling.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook verification or handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// Signature header absent or empty.
    #[error("Missing signature")]
    MissingSignature,

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Signed payload is not a valid event envelope.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Required field missing from the event object.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// An event handler failed or panicked.
    #[error("Handler failed: {0}")]
    HandlerFailed(String),
}

impl WebhookError {
    /// True for errors raised before an event is trusted.
    pub fn is_verification_failure(&self) -> bool {
        !matches!(
            self,
            WebhookError::MissingField(_) | WebhookError::HandlerFailed(_)
        )
    }

    /// Maps the error to an HTTP status code.
    ///
    /// Verification failures are rejected with 400. Handler failures are
    /// acknowledged with 200 so Stripe does not redeliver the event.
    pub fn status_code(&self) -> StatusCode {
        if self.is_verification_failure() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_signature_displays_correctly() {
        assert_eq!(WebhookError::MissingSignature.to_string(), "Missing signature");
    }

    #[test]
    fn invalid_signature_displays_correctly() {
        assert_eq!(WebhookError::InvalidSignature.to_string(), "Invalid signature");
    }

    #[test]
    fn parse_error_includes_detail() {
        let err = WebhookError::ParseError("missing timestamp".to_string());
        assert_eq!(err.to_string(), "Parse error: missing timestamp");
    }

    #[test]
    fn verification_failures_map_to_400() {
        for err in [
            WebhookError::MissingSignature,
            WebhookError::InvalidSignature,
            WebhookError::TimestampOutOfRange,
            WebhookError::InvalidTimestamp,
            WebhookError::ParseError("x".into()),
            WebhookError::InvalidPayload("x".into()),
        ] {
            assert!(err.is_verification_failure());
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn handler_failures_are_acknowledged() {
        for err in [
            WebhookError::MissingField("id"),
            WebhookError::HandlerFailed("boom".into()),
        ] {
            assert!(!err.is_verification_failure());
            assert_eq!(err.status_code(), StatusCode::OK);
        }
    }
}
