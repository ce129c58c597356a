//! Response transformation.
//!
//! A transformer is a pure function from a [`RawResponse`] to either a typed
//! entity or an [`ApiError`]. Status classification is shared by every
//! transformer: 2xx responses are decoded, the well-known failure codes map
//! to their dedicated error variants, and anything else becomes
//! [`ApiError::Internal`] with the status and reason preserved.

use serde::de::DeserializeOwned;

use super::error::{ApiError, FailurePayload};

/// One HTTP response as received from the transport, never mutated.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for the status.
    pub reason: String,
    /// Response body.
    pub body: String,
}

impl RawResponse {
    /// Create a raw response.
    #[must_use]
    pub fn new(status: u16, reason: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            body: body.into(),
        }
    }
}

/// A pure function from a raw response to a typed outcome.
pub trait Transform: Send + Sync {
    /// The decoded entity type.
    type Output;

    /// Transform a raw response into the output type or a typed error.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ApiError`] for non-success status codes, or
    /// [`ApiError::Internal`] when the body fails to decode.
    fn transform(&self, response: &RawResponse) -> Result<Self::Output, ApiError>;
}

/// Classify a status code, producing the mapped error for non-success codes.
///
/// # Errors
///
/// Returns the [`ApiError`] variant for the status code when it is not 2xx.
pub fn classify_status(response: &RawResponse) -> Result<(), ApiError> {
    let status = response.status;
    if (200..300).contains(&status) {
        return Ok(());
    }

    let reason = response.reason.clone();
    let message = FailurePayload::parse(&response.body).map(|p| p.message);

    Err(match status {
        401 => ApiError::Authentication {
            status,
            reason,
            message,
        },
        403 => ApiError::Forbidden {
            status,
            reason,
            message,
        },
        404 => ApiError::NotFound {
            status,
            reason,
            message,
        },
        422 => ApiError::Unprocessable {
            status,
            reason,
            message,
        },
        429 => ApiError::RateLimited {
            status,
            reason,
            message,
        },
        _ => ApiError::Internal {
            status: Some(status),
            message: reason,
        },
    })
}

/// Transformer decoding a JSON body into `T`.
///
/// `T` may be a single entity or any collection shape (`Vec<Order>`,
/// `HashMap<String, Vec<Bar>>`); the type parameter plays the role of the
/// reified type witness that dynamically-typed decoders need.
pub struct ValueTransformer<T> {
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> ValueTransformer<T> {
    /// Create a value transformer for `T`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T> Default for ValueTransformer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Transform for ValueTransformer<T> {
    type Output = T;

    fn transform(&self, response: &RawResponse) -> Result<T, ApiError> {
        classify_status(response)?;

        serde_json::from_str(&response.body).map_err(|e| ApiError::Internal {
            status: Some(response.status),
            message: format!("failed to decode response body: {e}"),
        })
    }
}

/// Transformer for operations whose success response carries no body,
/// such as order cancellation.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyTransformer;

impl EmptyTransformer {
    /// Create an empty-body transformer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Transform for EmptyTransformer {
    type Output = ();

    fn transform(&self, response: &RawResponse) -> Result<(), ApiError> {
        classify_status(response)
    }
}
