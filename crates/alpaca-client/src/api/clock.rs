//! Market clock endpoint and entity.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::{HttpClient, Listenable, Request, ValueTransformer};

const ENDPOINT: &str = "/v2/clock";

/// The market clock: current time, session state and the next transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    /// Current market timestamp.
    pub timestamp: DateTime<Utc>,

    /// Whether the market is currently open.
    pub is_open: bool,

    /// When the market next opens.
    pub next_open: DateTime<Utc>,

    /// When the market next closes.
    pub next_close: DateTime<Utc>,
}

/// The clock API serves the market's current session state.
#[derive(Debug, Clone)]
pub struct ClockApi {
    http: Arc<HttpClient>,
}

impl ClockApi {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Retrieve the market clock.
    #[must_use]
    pub fn get(&self) -> Listenable<Clock> {
        let request = Request::get(ENDPOINT).build();
        self.http.execute(request, ValueTransformer::<Clock>::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_clock() {
        let body = r#"{
            "timestamp": "2018-04-01T12:00:00.000Z",
            "is_open": true,
            "next_open": "2018-04-02T09:30:00.000-04:00",
            "next_close": "2018-04-01T16:00:00.000-04:00"
        }"#;
        let clock: Clock = serde_json::from_str(body).unwrap();
        assert!(clock.is_open);
        assert!(clock.next_open > clock.timestamp);
    }
}
