//! Order endpoints, entities and the validated order request builder.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::http::{
    ApiError, EmptyTransformer, HttpClient, Listenable, Request, ValueTransformer,
};

const ENDPOINT: &str = "/v2/orders";
const BY_CLIENT_ORDER_ID_ENDPOINT: &str = "/v2/orders:by_client_order_id";

const MAX_CLIENT_ORDER_ID_LEN: usize = 48;
const MAX_LIST_LIMIT: u32 = 500;
const LIST_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ============================================================================
// Entities
// ============================================================================

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Execute at the current market price.
    Market,
    /// Execute at the limit price or better.
    Limit,
    /// Convert to a market order once the stop price trades.
    Stop,
    /// Convert to a limit order once the stop price trades.
    StopLimit,
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy.
    Buy,
    /// Sell.
    Sell,
}

/// How long an order remains in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    /// Valid for the current trading day.
    Day,
    /// Good until canceled.
    Gtc,
    /// Execute in the opening auction only.
    Opg,
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Received and routed.
    New,
    /// Partially filled.
    PartiallyFilled,
    /// Completely filled.
    Filled,
    /// Done executing for the day.
    DoneForDay,
    /// Canceled.
    Canceled,
    /// Expired without executing.
    Expired,
    /// Accepted but not yet routed.
    Accepted,
    /// Received but not yet accepted.
    PendingNew,
    /// Accepted outside market hours.
    AcceptedForBidding,
    /// Cancelation requested but not yet confirmed.
    PendingCancel,
    /// Stopped by the exchange.
    Stopped,
    /// Rejected.
    Rejected,
    /// Suspended and not eligible for trading.
    Suspended,
    /// Calculated after a halt.
    Calculated,
}

/// An order, as reported by the trading host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order id.
    pub id: String,

    /// Client-supplied order id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,

    /// When the order record was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// When the order record was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// When the order was submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,

    /// When the order was filled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filled_at: Option<DateTime<Utc>>,

    /// When the order expired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<DateTime<Utc>>,

    /// When the order was canceled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canceled_at: Option<DateTime<Utc>>,

    /// When the order failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<DateTime<Utc>>,

    /// Asset id.
    pub asset_id: String,

    /// Ticker symbol.
    pub symbol: String,

    /// Asset class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_class: Option<String>,

    /// Ordered quantity.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub qty: Option<Decimal>,

    /// Filled quantity.
    #[serde(with = "rust_decimal::serde::str")]
    pub filled_qty: Decimal,

    /// Order type.
    #[serde(rename = "type")]
    pub order_type: OrderType,

    /// Order side.
    pub side: OrderSide,

    /// Time in force.
    pub time_in_force: TimeInForce,

    /// Limit price.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub limit_price: Option<Decimal>,

    /// Stop price.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_price: Option<Decimal>,

    /// Average fill price.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub filled_avg_price: Option<Decimal>,

    /// Lifecycle status.
    pub status: OrderStatus,

    /// Whether the order is eligible for extended hours execution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_hours: Option<bool>,
}

// ============================================================================
// Placement request
// ============================================================================

/// A validated new-order request.
///
/// Built through [`OrderRequest::builder`], which rejects inconsistent
/// parameter combinations before anything touches the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    qty: Decimal,
    side: OrderSide,
    #[serde(rename = "type")]
    order_type: OrderType,
    time_in_force: TimeInForce,
    #[serde(
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    limit_price: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    stop_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extended_hours: Option<bool>,
}

impl OrderRequest {
    /// Start building an order request.
    #[must_use]
    pub fn builder(
        symbol: impl Into<String>,
        qty: Decimal,
        side: OrderSide,
        order_type: OrderType,
        time_in_force: TimeInForce,
    ) -> OrderRequestBuilder {
        OrderRequestBuilder {
            symbol: symbol.into(),
            qty,
            side,
            order_type,
            time_in_force,
            limit_price: None,
            stop_price: None,
            client_order_id: None,
            extended_hours: None,
        }
    }
}

/// Builder for [`OrderRequest`].
#[derive(Debug, Clone)]
pub struct OrderRequestBuilder {
    symbol: String,
    qty: Decimal,
    side: OrderSide,
    order_type: OrderType,
    time_in_force: TimeInForce,
    limit_price: Option<Decimal>,
    stop_price: Option<Decimal>,
    client_order_id: Option<String>,
    extended_hours: Option<bool>,
}

impl OrderRequestBuilder {
    /// Set the limit price. Required for limit and stop-limit orders.
    #[must_use]
    pub const fn limit_price(mut self, price: Decimal) -> Self {
        self.limit_price = Some(price);
        self
    }

    /// Set the stop price. Required for stop and stop-limit orders.
    #[must_use]
    pub const fn stop_price(mut self, price: Decimal) -> Self {
        self.stop_price = Some(price);
        self
    }

    /// Attach a client-supplied order id, at most 48 characters.
    #[must_use]
    pub fn client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = Some(id.into());
        self
    }

    /// Mark the order eligible for extended hours execution.
    ///
    /// Only valid for day limit orders.
    #[must_use]
    pub const fn extended_hours(mut self, eligible: bool) -> Self {
        self.extended_hours = Some(eligible);
        self
    }

    /// Validate the parameter combination and produce the request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidParams`] when the quantity is not positive,
    /// a required price is missing or non-positive, a market order carries a
    /// price, the client order id exceeds 48 characters, or extended hours is
    /// requested for anything but a day limit order.
    pub fn build(self) -> Result<OrderRequest, ApiError> {
        if self.symbol.is_empty() {
            return Err(ApiError::invalid_params("symbol must not be empty"));
        }
        if self.qty <= Decimal::ZERO {
            return Err(ApiError::invalid_params(format!(
                "qty must be positive, got {}",
                self.qty
            )));
        }
        for (name, price) in [("limit_price", self.limit_price), ("stop_price", self.stop_price)] {
            if let Some(price) = price {
                if price <= Decimal::ZERO {
                    return Err(ApiError::invalid_params(format!(
                        "{name} must be positive, got {price}"
                    )));
                }
            }
        }
        match self.order_type {
            OrderType::Market => {
                if self.limit_price.is_some() || self.stop_price.is_some() {
                    return Err(ApiError::invalid_params(
                        "market orders must not carry limit_price or stop_price",
                    ));
                }
            }
            OrderType::Limit => {
                if self.limit_price.is_none() {
                    return Err(ApiError::invalid_params("limit orders require limit_price"));
                }
            }
            OrderType::Stop => {
                if self.stop_price.is_none() {
                    return Err(ApiError::invalid_params("stop orders require stop_price"));
                }
            }
            OrderType::StopLimit => {
                if self.limit_price.is_none() || self.stop_price.is_none() {
                    return Err(ApiError::invalid_params(
                        "stop-limit orders require both limit_price and stop_price",
                    ));
                }
            }
        }
        if let Some(ref id) = self.client_order_id {
            if id.len() > MAX_CLIENT_ORDER_ID_LEN {
                return Err(ApiError::invalid_params(format!(
                    "client_order_id must be at most {MAX_CLIENT_ORDER_ID_LEN} characters, got {}",
                    id.len()
                )));
            }
        }
        if self.extended_hours == Some(true)
            && (self.order_type != OrderType::Limit || self.time_in_force != TimeInForce::Day)
        {
            return Err(ApiError::invalid_params(
                "extended_hours is only valid for day limit orders",
            ));
        }

        Ok(OrderRequest {
            symbol: self.symbol,
            qty: self.qty,
            side: self.side,
            order_type: self.order_type,
            time_in_force: self.time_in_force,
            limit_price: self.limit_price,
            stop_price: self.stop_price,
            client_order_id: self.client_order_id,
            extended_hours: self.extended_hours,
        })
    }
}

// ============================================================================
// Listing filters
// ============================================================================

/// Which orders a listing should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatusFilter {
    /// Open orders only.
    Open,
    /// Closed orders only.
    Closed,
    /// Both open and closed orders.
    All,
}

impl OrderStatusFilter {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

/// Chronological direction of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Oldest first.
    Asc,
    /// Newest first.
    Desc,
}

impl Direction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// API
// ============================================================================

/// The orders API places, retrieves, lists and cancels orders.
#[derive(Debug, Clone)]
pub struct OrderApi {
    http: Arc<HttpClient>,
}

impl OrderApi {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// List orders matching the given filters.
    ///
    /// `limit` must be between 1 and 500 and `after` must precede `until`;
    /// violations resolve to [`ApiError::InvalidParams`].
    #[must_use]
    pub fn list(
        &self,
        status: OrderStatusFilter,
        limit: u32,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
        direction: Direction,
    ) -> Listenable<Vec<Order>> {
        if limit == 0 || limit > MAX_LIST_LIMIT {
            return Listenable::ready(Err(ApiError::invalid_params(format!(
                "limit must be between 1 and {MAX_LIST_LIMIT}, got {limit}"
            ))));
        }
        if after >= until {
            return Listenable::ready(Err(ApiError::invalid_params(
                "after must precede until",
            )));
        }
        let request = Request::get(ENDPOINT)
            .query("status", status.as_str())
            .query("limit", limit)
            .query("after", after.format(LIST_TIMESTAMP_FORMAT))
            .query("until", until.format(LIST_TIMESTAMP_FORMAT))
            .query("direction", direction)
            .build();
        self.http.execute(request, ValueTransformer::new())
    }

    /// Place a new order.
    ///
    /// Insufficient buying power resolves to
    /// [`ApiError::Forbidden`](crate::ApiError::Forbidden); a request the
    /// trading host cannot act on resolves to
    /// [`ApiError::Unprocessable`](crate::ApiError::Unprocessable).
    #[must_use]
    pub fn place(&self, order: &OrderRequest) -> Listenable<Order> {
        let body = match serde_json::to_string(order) {
            Ok(body) => body,
            Err(err) => {
                return Listenable::ready(Err(ApiError::internal(format!(
                    "failed to encode order request: {err}"
                ))));
            }
        };
        let request = Request::post(ENDPOINT).body(body).build();
        self.http.execute(request, ValueTransformer::<Order>::new())
    }

    /// Retrieve an order by id.
    #[must_use]
    pub fn get(&self, order_id: &str) -> Listenable<Order> {
        let request = Request::get(ENDPOINT).segment(order_id).build();
        self.http.execute(request, ValueTransformer::<Order>::new())
    }

    /// Retrieve an order by its client-supplied id.
    #[must_use]
    pub fn get_by_client_order_id(&self, client_order_id: &str) -> Listenable<Order> {
        let request = Request::get(BY_CLIENT_ORDER_ID_ENDPOINT)
            .query("client_order_id", client_order_id)
            .build();
        self.http.execute(request, ValueTransformer::<Order>::new())
    }

    /// Cancel an open order.
    ///
    /// Resolves to [`ApiError::NotFound`](crate::ApiError::NotFound) for an
    /// unknown id and [`ApiError::Unprocessable`](crate::ApiError::Unprocessable)
    /// when the order is no longer cancelable.
    #[must_use]
    pub fn cancel(&self, order_id: &str) -> Listenable<()> {
        let request = Request::delete(ENDPOINT).segment(order_id).build();
        self.http.execute(request, EmptyTransformer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market_day(symbol: &str, qty: i64) -> OrderRequestBuilder {
        OrderRequest::builder(
            symbol,
            Decimal::from(qty),
            OrderSide::Buy,
            OrderType::Market,
            TimeInForce::Day,
        )
    }

    #[test]
    fn builds_a_market_order() {
        let order = market_day("AAPL", 10).build().unwrap();
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains(r#""symbol":"AAPL""#));
        assert!(json.contains(r#""qty":"10""#));
        assert!(json.contains(r#""type":"market""#));
        assert!(json.contains(r#""time_in_force":"day""#));
        assert!(!json.contains("limit_price"));
    }

    #[test]
    fn rejects_non_positive_qty() {
        let err = market_day("AAPL", 0).build().unwrap_err();
        assert!(matches!(err, ApiError::InvalidParams { .. }));
    }

    #[test]
    fn rejects_market_order_with_limit_price() {
        let err = market_day("AAPL", 1)
            .limit_price(Decimal::from(100))
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidParams { .. }));
    }

    #[test]
    fn rejects_limit_order_without_limit_price() {
        let err = OrderRequest::builder(
            "AAPL",
            Decimal::ONE,
            OrderSide::Buy,
            OrderType::Limit,
            TimeInForce::Day,
        )
        .build()
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidParams { .. }));
    }

    #[test]
    fn rejects_stop_order_without_stop_price() {
        let err = OrderRequest::builder(
            "AAPL",
            Decimal::ONE,
            OrderSide::Sell,
            OrderType::Stop,
            TimeInForce::Gtc,
        )
        .build()
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidParams { .. }));
    }

    #[test]
    fn rejects_non_positive_price() {
        let err = OrderRequest::builder(
            "AAPL",
            Decimal::ONE,
            OrderSide::Buy,
            OrderType::Limit,
            TimeInForce::Day,
        )
        .limit_price(Decimal::ZERO)
        .build()
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidParams { .. }));
    }

    #[test]
    fn rejects_long_client_order_id() {
        let err = market_day("AAPL", 1)
            .client_order_id("x".repeat(49))
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidParams { .. }));
    }

    #[test]
    fn accepts_48_char_client_order_id() {
        let order = market_day("AAPL", 1)
            .client_order_id("x".repeat(48))
            .build()
            .unwrap();
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains("client_order_id"));
    }

    #[test]
    fn extended_hours_requires_day_limit() {
        let err = market_day("AAPL", 1).extended_hours(true).build().unwrap_err();
        assert!(matches!(err, ApiError::InvalidParams { .. }));

        let ok = OrderRequest::builder(
            "AAPL",
            Decimal::ONE,
            OrderSide::Buy,
            OrderType::Limit,
            TimeInForce::Day,
        )
        .limit_price(Decimal::from(100))
        .extended_hours(true)
        .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn builds_stop_limit_order() {
        let order = OrderRequest::builder(
            "TSLA",
            Decimal::from(5),
            OrderSide::Sell,
            OrderType::StopLimit,
            TimeInForce::Gtc,
        )
        .limit_price(Decimal::from(200))
        .stop_price(Decimal::from(205))
        .build()
        .unwrap();
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains(r#""type":"stop_limit""#));
        assert!(json.contains(r#""limit_price":"200""#));
        assert!(json.contains(r#""stop_price":"205""#));
    }

    #[test]
    fn deserializes_order() {
        let body = r#"{
            "id": "904837e3-3b76-47ec-b432-046db621571b",
            "client_order_id": "my-order-1",
            "created_at": "2018-10-05T05:48:59Z",
            "submitted_at": "2018-10-05T05:48:59Z",
            "asset_id": "904837e3-3b76-47ec-b432-046db621571b",
            "symbol": "AAPL",
            "asset_class": "us_equity",
            "qty": "15",
            "filled_qty": "0",
            "type": "market",
            "side": "buy",
            "time_in_force": "day",
            "limit_price": "107.00",
            "status": "accepted"
        }"#;
        let order: Order = serde_json::from_str(body).unwrap();
        assert_eq!(order.symbol, "AAPL");
        assert_eq!(order.status, OrderStatus::Accepted);
        assert_eq!(order.qty, Some(Decimal::from(15)));
        assert_eq!(order.filled_qty, Decimal::ZERO);
        assert!(order.filled_at.is_none());
    }
}
