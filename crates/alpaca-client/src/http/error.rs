//! Error taxonomy for the request pipeline.
//!
//! Every failure the library can produce is a variant of [`ApiError`]:
//! protocol errors carry the original status code and reason phrase, and
//! optionally the failure message Alpaca returns in the response body.
//! Errors are terminal values; nothing is retried internally.

use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced by the request pipeline and the event stream.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// HTTP 401.
    #[error("authentication failed ({status}): {reason}")]
    Authentication {
        /// Original status code.
        status: u16,
        /// Reason phrase from the response.
        reason: String,
        /// Parsed failure message, when the error body was JSON.
        message: Option<String>,
    },

    /// HTTP 403, e.g. insufficient buying power.
    #[error("forbidden ({status}): {reason}")]
    Forbidden {
        /// Original status code.
        status: u16,
        /// Reason phrase from the response.
        reason: String,
        /// Parsed failure message, when the error body was JSON.
        message: Option<String>,
    },

    /// HTTP 404.
    #[error("entity not found ({status}): {reason}")]
    NotFound {
        /// Original status code.
        status: u16,
        /// Reason phrase from the response.
        reason: String,
        /// Parsed failure message, when the error body was JSON.
        message: Option<String>,
    },

    /// HTTP 422, malformed or unrecognized parameters.
    #[error("unprocessable request ({status}): {reason}")]
    Unprocessable {
        /// Original status code.
        status: u16,
        /// Reason phrase from the response.
        reason: String,
        /// Parsed failure message, when the error body was JSON.
        message: Option<String>,
    },

    /// HTTP 429.
    #[error("rate limited ({status}): {reason}")]
    RateLimited {
        /// Original status code.
        status: u16,
        /// Reason phrase from the response.
        reason: String,
        /// Parsed failure message, when the error body was JSON.
        message: Option<String>,
    },

    /// Stream negotiation did not grant the requested subscription set.
    #[error("unable to subscribe to trade_updates, account_updates; subscribed streams: {granted:?}")]
    Subscription {
        /// Streams the server actually granted.
        granted: Vec<String>,
    },

    /// Invalid parameters detected before a request was issued.
    #[error("invalid parameters: {message}")]
    InvalidParams {
        /// What was wrong with the parameters.
        message: String,
    },

    /// Any other non-2xx status, transport-level fault, or decode failure.
    #[error("internal error: {message}")]
    Internal {
        /// Status code, when the failure came from an HTTP response.
        status: Option<u16>,
        /// Description of the failure.
        message: String,
    },
}

impl ApiError {
    /// Build an [`ApiError::Internal`] with no associated status code.
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            status: None,
            message: message.into(),
        }
    }

    /// Build an [`ApiError::InvalidParams`].
    pub(crate) fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// The original HTTP status code, when this error came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. }
            | Self::Forbidden { status, .. }
            | Self::NotFound { status, .. }
            | Self::Unprocessable { status, .. }
            | Self::RateLimited { status, .. } => Some(*status),
            Self::Internal { status, .. } => *status,
            Self::Subscription { .. } | Self::InvalidParams { .. } => None,
        }
    }
}

/// Failure payload Alpaca returns in error response bodies.
///
/// # Wire Format (JSON)
/// ```json
/// {"code": 40110000, "message": "request is not authorized"}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct FailurePayload {
    /// Alpaca-specific error code.
    #[serde(default)]
    pub code: Option<i64>,
    /// Human-readable failure message.
    pub message: String,
}

impl FailurePayload {
    /// Try to parse a failure payload out of an error response body.
    #[must_use]
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_preserved() {
        let err = ApiError::NotFound {
            status: 404,
            reason: "Order not found".to_string(),
            message: None,
        };
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn subscription_error_names_granted_streams() {
        let err = ApiError::Subscription {
            granted: vec!["trade_updates".to_string()],
        };
        let text = err.to_string();
        assert!(text.contains("trade_updates"));
        assert!(text.contains("account_updates"));
    }

    #[test]
    fn failure_payload_parses_json_body() {
        let payload = FailurePayload::parse(r#"{"code":40110000,"message":"unauthorized"}"#);
        let payload = payload.unwrap();
        assert_eq!(payload.code, Some(40_110_000));
        assert_eq!(payload.message, "unauthorized");
    }

    #[test]
    fn failure_payload_rejects_non_json() {
        assert!(FailurePayload::parse("Rate limit exceeded").is_none());
    }
}
