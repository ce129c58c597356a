//! Client configuration and credentials.

use std::time::Duration;

use crate::http::error::ApiError;

/// Trading environment for the Alpaca API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Paper trading (simulated).
    Paper,
    /// Live trading (real money).
    Live,
}

impl Environment {
    /// Get the base URL for the trading API.
    #[must_use]
    pub const fn trading_base_url(&self) -> &'static str {
        match self {
            Self::Paper => "https://paper-api.alpaca.markets",
            Self::Live => "https://api.alpaca.markets",
        }
    }

    /// Get the base URL for the market data API.
    #[must_use]
    pub const fn data_base_url(&self) -> &'static str {
        "https://data.alpaca.markets"
    }

    /// Get the WebSocket URL for the account event stream.
    #[must_use]
    pub const fn stream_url(&self) -> &'static str {
        match self {
            Self::Paper => "wss://paper-api.alpaca.markets/stream",
            Self::Live => "wss://api.alpaca.markets/stream",
        }
    }

    /// Check if this is live trading.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paper => write!(f, "PAPER"),
            Self::Live => write!(f, "LIVE"),
        }
    }
}

/// Alpaca API credentials.
///
/// Stores the API key id and secret attached to every request.
/// The `Debug` implementation redacts the secret for safe logging.
#[derive(Clone)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    /// Create new credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidParams`] if either key or secret is empty.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Result<Self, ApiError> {
        let key = key.into();
        let secret = secret.into();

        if key.is_empty() {
            return Err(ApiError::invalid_params("API key cannot be empty"));
        }
        if secret.is_empty() {
            return Err(ApiError::invalid_params("API secret cannot be empty"));
        }

        Ok(Self { key, secret })
    }

    /// Create credentials from environment variables.
    ///
    /// Reads `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY` from environment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidParams`] if either variable is not set or empty.
    pub fn from_env() -> Result<Self, ApiError> {
        let key = std::env::var("APCA_API_KEY_ID").map_err(|_| {
            ApiError::invalid_params("APCA_API_KEY_ID environment variable not set")
        })?;
        let secret = std::env::var("APCA_API_SECRET_KEY").map_err(|_| {
            ApiError::invalid_params("APCA_API_SECRET_KEY environment variable not set")
        })?;

        Self::new(key, secret)
    }

    /// Get the API key id.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the API secret.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Configuration for the REST client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API credentials.
    pub credentials: Credentials,
    /// Trading environment.
    pub environment: Environment,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a new configuration.
    #[must_use]
    pub const fn new(credentials: Credentials, environment: Environment) -> Self {
        Self {
            credentials,
            environment,
            timeout: Duration::from_secs(30),
        }
    }

    /// Create configuration for the paper trading environment.
    #[must_use]
    pub const fn paper(credentials: Credentials) -> Self {
        Self::new(credentials, Environment::Paper)
    }

    /// Create configuration for the live trading environment.
    #[must_use]
    pub const fn live(credentials: Credentials) -> Self {
        Self::new(credentials, Environment::Live)
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_environment_urls() {
        let env = Environment::Paper;
        assert!(env.trading_base_url().contains("paper"));
        assert!(env.stream_url().contains("paper"));
        assert!(!env.is_live());
    }

    #[test]
    fn live_environment_urls() {
        let env = Environment::Live;
        assert!(!env.trading_base_url().contains("paper"));
        assert!(env.stream_url().ends_with("/stream"));
        assert!(env.is_live());
    }

    #[test]
    fn empty_credentials_rejected() {
        assert!(Credentials::new("", "secret").is_err());
        assert!(Credentials::new("key", "").is_err());
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let creds = Credentials::new("key", "secret").unwrap();
        let debug = format!("{creds:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn config_defaults() {
        let creds = Credentials::new("key", "secret").unwrap();
        let config = ClientConfig::paper(creds);
        assert_eq!(config.environment, Environment::Paper);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
