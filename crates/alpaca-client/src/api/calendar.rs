//! Market calendar endpoint and entity.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::http::{ApiError, HttpClient, Listenable, Request, ValueTransformer};

const ENDPOINT: &str = "/v2/calendar";

/// Serde helper for `HH:MM` session times.
mod hour_minute {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A single trading day with its session open and close times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    /// Trading date.
    pub date: NaiveDate,

    /// Session open time, market local.
    #[serde(with = "hour_minute")]
    pub open: NaiveTime,

    /// Session close time, market local.
    #[serde(with = "hour_minute")]
    pub close: NaiveTime,
}

/// The calendar API serves market trading days and session hours.
#[derive(Debug, Clone)]
pub struct CalendarApi {
    http: Arc<HttpClient>,
}

impl CalendarApi {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Retrieve trading days between `start` and `end`, inclusive.
    ///
    /// Resolves to [`ApiError::InvalidParams`] when `start` is after `end`.
    #[must_use]
    pub fn get(&self, start: NaiveDate, end: NaiveDate) -> Listenable<Vec<Calendar>> {
        if start > end {
            return Listenable::ready(Err(ApiError::invalid_params(
                "start must not be after end",
            )));
        }
        let request = Request::get(ENDPOINT)
            .query("start", start)
            .query("end", end)
            .build();
        self.http.execute(request, ValueTransformer::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_session_times() {
        let body = r#"[{"date": "2018-01-03", "open": "09:30", "close": "16:00"}]"#;
        let days: Vec<Calendar> = serde_json::from_str(body).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2018, 1, 3).unwrap());
        assert_eq!(days[0].open, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(days[0].close, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
    }

    #[test]
    fn serializes_session_times_without_seconds() {
        let day = Calendar {
            date: NaiveDate::from_ymd_opt(2018, 1, 3).unwrap(),
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            close: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        };
        let json = serde_json::to_string(&day).unwrap();
        assert!(json.contains(r#""open":"09:30""#));
        assert!(json.contains(r#""close":"16:00""#));
    }
}
