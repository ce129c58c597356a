#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access
    )
)]

//! Alpaca Trading API Client
//!
//! An async client for Alpaca's brokerage REST API and account event stream.
//!
//! # Layers
//!
//! - `config`: Environments, credentials, and client configuration
//! - `http`: Request descriptors, status-to-error classification, response
//!   transformation, and the dual await/callback result future
//! - `api`: Typed REST resources (account, assets, bars, calendar, clock,
//!   orders, positions)
//! - `stream`: WebSocket account event stream with subscription fan-out
//!
//! # Example
//!
//! ```no_run
//! use alpaca_client::{AlpacaClient, ClientConfig, Credentials};
//!
//! # async fn example() -> Result<(), alpaca_client::ApiError> {
//! let credentials = Credentials::new("key-id", "secret")?;
//! let client = AlpacaClient::new(&ClientConfig::paper(credentials))?;
//!
//! let account = client.account().get().await_outcome().await?;
//! println!("buying power: {}", account.buying_power);
//! # Ok(())
//! # }
//! ```
//!
//! Every request returns a [`Listenable`], which can be awaited or given a
//! completion callback; either way the single outcome is observed exactly
//! once per consumer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Environments, credentials, and client configuration.
pub mod config;

/// HTTP request pipeline and the result future.
pub mod http;

/// Typed REST resources.
pub mod api;

/// Account event streaming.
pub mod stream;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ClientConfig, Credentials, Environment};

pub use http::{ApiError, HttpClient, Listenable, Outcome};

pub use api::{
    Account, AccountApi, AccountStatus, AlpacaClient, Asset, AssetApi, AssetClass, AssetStatus,
    Bar, BarApi, Calendar, CalendarApi, Clock, ClockApi, Direction, Order, OrderApi, OrderRequest,
    OrderRequestBuilder, OrderSide, OrderStatus, OrderStatusFilter, OrderType, Position,
    PositionApi, PositionSide, Timeframe, TimeInForce,
};

pub use stream::{
    AccountUpdate, EventKind, EventListener, StreamClient, StreamConfig, StreamEvent,
    StreamUpdate, SubscriptionRegistry, TradeEventType, TradeUpdate,
};
