//! Position endpoints and entity.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::http::{HttpClient, Listenable, Request, ValueTransformer};

const ENDPOINT: &str = "/v2/positions";

/// Side of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    /// Long position.
    Long,
    /// Short position.
    Short,
}

/// An open position in a single asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Asset id.
    pub asset_id: String,

    /// Ticker symbol.
    pub symbol: String,

    /// Exchange the asset trades on.
    pub exchange: String,

    /// Asset class.
    pub asset_class: String,

    /// Average entry price.
    #[serde(with = "rust_decimal::serde::str")]
    pub avg_entry_price: Decimal,

    /// Number of shares held.
    #[serde(with = "rust_decimal::serde::str")]
    pub qty: Decimal,

    /// Position side.
    pub side: PositionSide,

    /// Total market value of the position.
    #[serde(with = "rust_decimal::serde::str")]
    pub market_value: Decimal,

    /// Total cost basis.
    #[serde(with = "rust_decimal::serde::str")]
    pub cost_basis: Decimal,

    /// Unrealized profit or loss.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub unrealized_pl: Option<Decimal>,

    /// Unrealized profit or loss as a fraction of cost basis.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub unrealized_plpc: Option<Decimal>,

    /// Unrealized profit or loss for the current day.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub unrealized_intraday_pl: Option<Decimal>,

    /// Unrealized intraday profit or loss as a fraction of cost basis.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub unrealized_intraday_plpc: Option<Decimal>,

    /// Current asset price.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_price: Option<Decimal>,

    /// Closing price from the previous trading day.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub lastday_price: Option<Decimal>,

    /// Price change since the previous close as a fraction.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub change_today: Option<Decimal>,
}

/// The positions API serves the account's open positions.
#[derive(Debug, Clone)]
pub struct PositionApi {
    http: Arc<HttpClient>,
}

impl PositionApi {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// List all open positions.
    #[must_use]
    pub fn list(&self) -> Listenable<Vec<Position>> {
        let request = Request::get(ENDPOINT).build();
        self.http
            .execute(request, ValueTransformer::<Vec<Position>>::new())
    }

    /// Retrieve the open position for a symbol.
    ///
    /// Resolves to [`ApiError::NotFound`](crate::ApiError::NotFound) when no
    /// position is open in that symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Listenable<Position> {
        let request = Request::get(ENDPOINT).segment(symbol).build();
        self.http
            .execute(request, ValueTransformer::<Position>::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_position() {
        let body = r#"{
            "asset_id": "904837e3-3b76-47ec-b432-046db621571b",
            "symbol": "AAPL",
            "exchange": "NASDAQ",
            "asset_class": "us_equity",
            "avg_entry_price": "100.0",
            "qty": "5",
            "side": "long",
            "market_value": "600.0",
            "cost_basis": "500.0",
            "unrealized_pl": "100.0",
            "unrealized_plpc": "0.20",
            "current_price": "120.0",
            "lastday_price": "119.0",
            "change_today": "0.0084"
        }"#;
        let position: Position = serde_json::from_str(body).unwrap();
        assert_eq!(position.symbol, "AAPL");
        assert_eq!(position.side, PositionSide::Long);
        assert_eq!(position.qty, Decimal::from(5));
        assert_eq!(position.unrealized_pl, Some(Decimal::from(100)));
        assert!(position.unrealized_intraday_pl.is_none());
    }
}
