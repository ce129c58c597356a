//! Stream event and control message types.
//!
//! # Wire Format
//!
//! Every server frame is an envelope tagged by stream:
//!
//! ```json
//! {"stream": "trade_updates", "data": {"event": "fill", "qty": 15, "price": 179.08, "order": {...}}}
//! {"stream": "authorization", "data": {"status": "authorized", "action": "authenticate"}}
//! {"stream": "listening", "data": {"streams": ["trade_updates"]}}
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::order::Order;
use crate::api::account::AccountStatus;

/// The event streams a connection can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Order lifecycle events.
    TradeUpdates,
    /// Account change events.
    AccountUpdates,
}

impl EventKind {
    /// Wire tag of the stream.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TradeUpdates => "trade_updates",
            Self::AccountUpdates => "account_updates",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeEventType {
    /// The order was routed.
    New,
    /// The order filled completely.
    Fill,
    /// The order filled in part.
    PartialFill,
    /// The order was canceled.
    Canceled,
    /// The order expired.
    Expired,
    /// The order executed for the day.
    DoneForDay,
    /// The order was rejected.
    Rejected,
    /// A replacement was applied.
    Replaced,
    /// A cancelation is pending.
    PendingCancel,
    /// The order is pending routing.
    PendingNew,
    /// The order was stopped.
    Stopped,
    /// The order was suspended.
    Suspended,
    /// The order was recalculated after a halt.
    Calculated,
    /// An earlier cancelation was rejected.
    OrderCancelRejected,
    /// An earlier replacement was rejected.
    OrderReplaceRejected,
}

/// An order lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeUpdate {
    /// What happened.
    pub event: TradeEventType,

    /// Quantity involved in the event, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<Decimal>,

    /// Price involved in the event, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,

    /// When the event occurred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// The order the event concerns.
    pub order: Order,
}

/// An account change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountUpdate {
    /// Account id.
    pub id: String,

    /// When the account was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// When the account was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// When the account was deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,

    /// Account status.
    pub status: AccountStatus,

    /// Account currency.
    pub currency: String,

    /// Cash balance.
    #[serde(with = "rust_decimal::serde::str")]
    pub cash: Decimal,

    /// Withdrawable cash amount.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub cash_withdrawable: Option<Decimal>,
}

/// A decoded event, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StreamEvent {
    /// An order lifecycle event.
    TradeUpdate(Box<TradeUpdate>),
    /// An account change event.
    AccountUpdate(AccountUpdate),
}

impl StreamEvent {
    /// The stream this event belongs to.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::TradeUpdate(_) => EventKind::TradeUpdates,
            Self::AccountUpdate(_) => EventKind::AccountUpdates,
        }
    }
}

/// A tagged event envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamUpdate {
    /// Stream tag.
    pub stream: EventKind,
    /// Event payload.
    pub data: StreamEvent,
}

// ============================================================================
// Control messages
// ============================================================================

/// Authentication acknowledgment payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationData {
    /// "authorized" or "unauthorized".
    pub status: String,
    /// The action being acknowledged.
    pub action: String,
}

/// `{"stream": "authorization", ...}` frame payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationMessage {
    /// Acknowledgment details.
    pub data: AuthorizationData,
}

impl AuthorizationMessage {
    /// Whether the credentials were accepted.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.data.status == "authorized"
    }
}

/// Subscription acknowledgment payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListeningData {
    /// Streams the server will deliver.
    pub streams: Vec<String>,
}

/// `{"stream": "listening", ...}` frame payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListeningMessage {
    /// Acknowledgment details.
    pub data: ListeningData,
}

// ============================================================================
// Outbound requests
// ============================================================================

/// Credentials payload of an authenticate request.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticateData {
    /// API key id.
    pub key_id: String,
    /// API secret key.
    pub secret_key: String,
}

/// `{"action": "authenticate", ...}` client frame.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticateRequest {
    /// Always "authenticate".
    pub action: &'static str,
    /// Credentials.
    pub data: AuthenticateData,
}

impl AuthenticateRequest {
    /// Build an authenticate frame for the given credentials.
    #[must_use]
    pub fn new(key_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            action: "authenticate",
            data: AuthenticateData {
                key_id: key_id.into(),
                secret_key: secret_key.into(),
            },
        }
    }
}

/// Streams payload of a listen request.
#[derive(Debug, Clone, Serialize)]
pub struct ListenData {
    /// Stream tags to subscribe to.
    pub streams: Vec<EventKind>,
}

/// `{"action": "listen", ...}` client frame.
#[derive(Debug, Clone, Serialize)]
pub struct ListenRequest {
    /// Always "listen".
    pub action: &'static str,
    /// Requested streams.
    pub data: ListenData,
}

impl ListenRequest {
    /// Build a listen frame for the given streams.
    #[must_use]
    pub fn new(streams: Vec<EventKind>) -> Self {
        Self {
            action: "listen",
            data: ListenData { streams },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_wire_tags() {
        assert_eq!(EventKind::TradeUpdates.to_string(), "trade_updates");
        assert_eq!(EventKind::AccountUpdates.to_string(), "account_updates");
        assert_eq!(
            serde_json::to_string(&EventKind::TradeUpdates).unwrap(),
            r#""trade_updates""#
        );
    }

    #[test]
    fn authenticate_request_shape() {
        let request = AuthenticateRequest::new("key", "secret");
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""action":"authenticate""#));
        assert!(json.contains(r#""key_id":"key""#));
        assert!(json.contains(r#""secret_key":"secret""#));
    }

    #[test]
    fn listen_request_shape() {
        let request = ListenRequest::new(vec![EventKind::TradeUpdates]);
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"action":"listen","data":{"streams":["trade_updates"]}}"#);
    }

    #[test]
    fn deserializes_account_update() {
        let body = r#"{
            "id": "904837e3-3b76-47ec-b432-046db621571b",
            "status": "ACTIVE",
            "currency": "USD",
            "cash": "1000.00",
            "cash_withdrawable": "500.00"
        }"#;
        let update: AccountUpdate = serde_json::from_str(body).unwrap();
        assert_eq!(update.status, AccountStatus::Active);
        assert_eq!(update.cash, Decimal::from(1000));
    }
}
