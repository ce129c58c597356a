//! Typed REST resource APIs and the top-level client facade.

pub mod account;
pub mod asset;
pub mod bar;
pub mod calendar;
pub mod clock;
pub mod order;
pub mod position;

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::http::{ApiError, HttpClient};

pub use account::{Account, AccountApi, AccountStatus};
pub use asset::{Asset, AssetApi, AssetClass, AssetStatus};
pub use bar::{Bar, BarApi, Timeframe};
pub use calendar::{Calendar, CalendarApi};
pub use clock::{Clock, ClockApi};
pub use order::{
    Direction, Order, OrderApi, OrderRequest, OrderRequestBuilder, OrderSide, OrderStatus,
    OrderStatusFilter, OrderType, TimeInForce,
};
pub use position::{Position, PositionApi, PositionSide};

/// Entry point for the REST surface.
///
/// Cheap to clone; all resource handles share one HTTP client.
#[derive(Debug, Clone)]
pub struct AlpacaClient {
    http: Arc<HttpClient>,
}

impl AlpacaClient {
    /// Build a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            http: Arc::new(HttpClient::new(config)?),
        })
    }

    /// Build a client around a preconfigured HTTP executor.
    #[must_use]
    pub fn with_http(http: HttpClient) -> Self {
        Self {
            http: Arc::new(http),
        }
    }

    /// Account details.
    #[must_use]
    pub fn account(&self) -> AccountApi {
        AccountApi::new(Arc::clone(&self.http))
    }

    /// Tradable assets.
    #[must_use]
    pub fn assets(&self) -> AssetApi {
        AssetApi::new(Arc::clone(&self.http))
    }

    /// Historical market data bars.
    #[must_use]
    pub fn bars(&self) -> BarApi {
        BarApi::new(Arc::clone(&self.http))
    }

    /// Market calendar.
    #[must_use]
    pub fn calendar(&self) -> CalendarApi {
        CalendarApi::new(Arc::clone(&self.http))
    }

    /// Market clock.
    #[must_use]
    pub fn clock(&self) -> ClockApi {
        ClockApi::new(Arc::clone(&self.http))
    }

    /// Order management.
    #[must_use]
    pub fn orders(&self) -> OrderApi {
        OrderApi::new(Arc::clone(&self.http))
    }

    /// Open positions.
    #[must_use]
    pub fn positions(&self) -> PositionApi {
        PositionApi::new(Arc::clone(&self.http))
    }
}
