//! Market data bar endpoint and entities.
//!
//! Bars are served from the data host rather than the trading host, keyed by
//! symbol in the response map.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::http::{ApiError, HttpClient, Listenable, Request, ValueTransformer};

const ENDPOINT: &str = "/v1/bars";

/// The largest number of bars a single request may return.
const MAX_LIMIT: u32 = 1_000;

/// Aggregation window of a bar request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    /// One minute, spelled out.
    Minute,
    /// One minute.
    OneMinute,
    /// Five minutes.
    FiveMinutes,
    /// Fifteen minutes.
    FifteenMinutes,
    /// One trading day.
    Day,
}

impl Timeframe {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::OneMinute => "1Min",
            Self::FiveMinutes => "5Min",
            Self::FifteenMinutes => "15Min",
            Self::Day => "day",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single OHLCV aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Beginning of the bar window.
    #[serde(rename = "t", with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,

    /// Open price.
    #[serde(rename = "o")]
    pub open: Decimal,

    /// High price.
    #[serde(rename = "h")]
    pub high: Decimal,

    /// Low price.
    #[serde(rename = "l")]
    pub low: Decimal,

    /// Close price.
    #[serde(rename = "c")]
    pub close: Decimal,

    /// Traded volume.
    #[serde(rename = "v")]
    pub volume: i64,
}

/// The bars API serves historical OHLCV aggregates from the data host.
#[derive(Debug, Clone)]
pub struct BarApi {
    http: Arc<HttpClient>,
}

impl BarApi {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Retrieve bars for one or more symbols over a time window.
    ///
    /// When `time_inclusive` is set the window bounds are sent as
    /// `start`/`end`, otherwise as `after`/`until`. `limit` caps the number of
    /// bars per symbol and must be between 1 and 1000.
    #[must_use]
    pub fn get(
        &self,
        symbols: &[&str],
        timeframe: Timeframe,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        time_inclusive: bool,
        limit: Option<u32>,
    ) -> Listenable<HashMap<String, Vec<Bar>>> {
        if symbols.is_empty() {
            return Listenable::ready(Err(ApiError::invalid_params(
                "at least one symbol is required",
            )));
        }
        if start > end {
            return Listenable::ready(Err(ApiError::invalid_params(
                "start must not be after end",
            )));
        }
        if let Some(limit) = limit {
            if limit == 0 || limit > MAX_LIMIT {
                return Listenable::ready(Err(ApiError::invalid_params(format!(
                    "limit must be between 1 and {MAX_LIMIT}, got {limit}"
                ))));
            }
        }

        let mut builder = Request::get(ENDPOINT)
            .segment(timeframe.as_str())
            .query("symbols", symbols.join(","));
        builder = if time_inclusive {
            builder
                .query("start", start.to_rfc3339())
                .query("end", end.to_rfc3339())
        } else {
            builder
                .query("after", start.to_rfc3339())
                .query("until", end.to_rfc3339())
        };
        if let Some(limit) = limit {
            builder = builder.query("limit", limit);
        }

        self.http
            .execute_data(builder.build(), ValueTransformer::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn deserializes_bars_keyed_by_symbol() {
        let body = r#"{
            "AAPL": [
                {"t": 1544129220, "o": 172.26, "h": 172.3, "l": 172.16, "c": 172.18, "v": 3892}
            ]
        }"#;
        let bars: HashMap<String, Vec<Bar>> = serde_json::from_str(body).unwrap();
        let aapl = &bars["AAPL"];
        assert_eq!(aapl.len(), 1);
        assert_eq!(aapl[0].time, Utc.timestamp_opt(1_544_129_220, 0).unwrap());
        assert_eq!(aapl[0].volume, 3892);
    }

    #[test]
    fn timeframe_path_segments() {
        assert_eq!(Timeframe::Minute.to_string(), "minute");
        assert_eq!(Timeframe::OneMinute.to_string(), "1Min");
        assert_eq!(Timeframe::FiveMinutes.to_string(), "5Min");
        assert_eq!(Timeframe::FifteenMinutes.to_string(), "15Min");
        assert_eq!(Timeframe::Day.to_string(), "day");
    }
}
