//! HTTP executor.
//!
//! [`HttpClient`] turns a [`Request`] descriptor into an in-flight reqwest
//! call and hands back a [`Listenable`] parameterized by a transformer. The
//! client attaches the two authentication headers and the JSON content-type
//! to every request; connection pooling and TLS are reqwest's concern.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;

use crate::config::ClientConfig;

use super::error::ApiError;
use super::listenable::Listenable;
use super::request::{Method, Request};
use super::transformer::{RawResponse, Transform};

/// Header carrying the API key id.
pub const APCA_API_KEY_ID: &str = "APCA-API-KEY-ID";

/// Header carrying the API secret.
pub const APCA_API_SECRET_KEY: &str = "APCA-API-SECRET-KEY";

/// HTTP client for the Alpaca REST API.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    trading_base_url: Arc<str>,
    data_base_url: Arc<str>,
    api_key: Arc<str>,
    api_secret: Arc<str>,
}

impl HttpClient {
    /// Create a new HTTP client from config.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] if the underlying client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::internal(e.to_string()))?;

        Ok(Self {
            client,
            trading_base_url: config.environment.trading_base_url().into(),
            data_base_url: config.environment.data_base_url().into(),
            api_key: config.credentials.key().into(),
            api_secret: config.credentials.secret().into(),
        })
    }

    /// Point the client at different hosts, e.g. a local proxy.
    #[must_use]
    pub fn with_base_urls(mut self, trading_base_url: &str, data_base_url: &str) -> Self {
        self.trading_base_url = trading_base_url.into();
        self.data_base_url = data_base_url.into();
        self
    }

    /// Execute a request against the trading API.
    ///
    /// The call is spawned immediately; the returned [`Listenable`] resolves
    /// to the transformer's output once the response arrives.
    pub fn execute<X>(&self, request: Request, transformer: X) -> Listenable<X::Output>
    where
        X: Transform + 'static,
        X::Output: Clone + Send + Sync + 'static,
    {
        let base_url = Arc::clone(&self.trading_base_url);
        self.execute_at(&base_url, request, transformer)
    }

    /// Execute a request against the market data API.
    pub fn execute_data<X>(&self, request: Request, transformer: X) -> Listenable<X::Output>
    where
        X: Transform + 'static,
        X::Output: Clone + Send + Sync + 'static,
    {
        let base_url = Arc::clone(&self.data_base_url);
        self.execute_at(&base_url, request, transformer)
    }

    fn execute_at<X>(&self, base_url: &str, request: Request, transformer: X) -> Listenable<X::Output>
    where
        X: Transform + 'static,
        X::Output: Clone + Send + Sync + 'static,
    {
        let pending = self.send(base_url, &request);
        Listenable::spawn(async move {
            let raw = pending.await?;
            transformer.transform(&raw)
        })
    }

    /// Issue the request and collect status, reason phrase and body.
    ///
    /// Transport-level faults (connection error, timeout) are wrapped as
    /// [`ApiError::Internal`] rather than propagated as reqwest errors.
    fn send(
        &self,
        base_url: &str,
        request: &Request,
    ) -> impl std::future::Future<Output = Result<RawResponse, ApiError>> + Send + 'static {
        let url = format!("{base_url}{}", request.path());

        let mut builder = match request.method() {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };

        builder = builder
            .header(APCA_API_KEY_ID, self.api_key.as_ref())
            .header(APCA_API_SECRET_KEY, self.api_secret.as_ref())
            .header(CONTENT_TYPE, "application/json")
            .query(request.query());

        if let Some(body) = request.body() {
            builder = builder.body(body.to_string());
        }

        async move {
            let response = builder
                .send()
                .await
                .map_err(|e| ApiError::internal(e.to_string()))?;

            let status = response.status();
            let reason = status.canonical_reason().unwrap_or_default().to_string();
            let body = response
                .text()
                .await
                .map_err(|e| ApiError::internal(e.to_string()))?;

            tracing::debug!(status = status.as_u16(), url = %url, "response received");

            Ok(RawResponse {
                status: status.as_u16(),
                reason,
                body,
            })
        }
    }
}
