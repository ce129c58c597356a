//! Account endpoint and entity.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::http::{HttpClient, Listenable, Request, ValueTransformer};

const ENDPOINT: &str = "/v2/account";

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// The account is onboarding.
    Onboarding,
    /// The account application submission failed.
    SubmissionFailed,
    /// The account application has been submitted for review.
    Submitted,
    /// The account information is being updated.
    AccountUpdated,
    /// The final account approval is pending.
    ApprovalPending,
    /// The account is active for trading.
    Active,
    /// The account application has been rejected.
    Rejected,
}

/// A trading account snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account id.
    pub id: String,

    /// Account number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,

    /// Account status.
    pub status: AccountStatus,

    /// Account currency.
    pub currency: String,

    /// Current available buying power.
    #[serde(with = "rust_decimal::serde::str")]
    pub buying_power: Decimal,

    /// Buying power under Regulation T.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub regt_buying_power: Option<Decimal>,

    /// Buying power for day trades, continuously updated.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub daytrading_buying_power: Option<Decimal>,

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

    /// Total value of cash plus holding positions.
    #[serde(with = "rust_decimal::serde::str")]
    pub portfolio_value: Decimal,

    /// Whether the account has been flagged as a pattern day trader.
    pub pattern_day_trader: bool,

    /// Whether the account is blocked from placing orders.
    pub trading_blocked: bool,

    /// Whether the account is blocked from requesting money transfers.
    pub transfers_blocked: bool,

    /// Whether all account activity is prohibited.
    pub account_blocked: bool,

    /// Whether trading was suspended by the user.
    pub trade_suspended_by_user: bool,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// Whether the account is permitted to short.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shorting_enabled: Option<bool>,

    /// Buying power multiplier: 1, 2 or 4.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub multiplier: Option<Decimal>,

    /// Real-time market value of all long positions.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub long_market_value: Option<Decimal>,

    /// Real-time market value of all short positions.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub short_market_value: Option<Decimal>,

    /// Cash plus long and short market value.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub equity: Option<Decimal>,

    /// Equity as of the previous trading day.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_equity: Option<Decimal>,

    /// Reg T initial margin requirement.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_margin: Option<Decimal>,

    /// Maintenance margin requirement.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub maintenance_margin: Option<Decimal>,

    /// Day trades made in the last five trading days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daytrade_count: Option<u32>,

    /// Value of the special memorandum account.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub sma: Option<Decimal>,
}

/// The account API serves the details of the authenticated trading account.
#[derive(Debug, Clone)]
pub struct AccountApi {
    http: Arc<HttpClient>,
}

impl AccountApi {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Retrieve the account details.
    #[must_use]
    pub fn get(&self) -> Listenable<Account> {
        let request = Request::get(ENDPOINT).build();
        self.http.execute(request, ValueTransformer::<Account>::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "id": "904837e3-3b76-47ec-b432-046db621571b",
        "status": "ACTIVE",
        "currency": "USD",
        "buying_power": "1",
        "cash": "2",
        "cash_withdrawable": "3",
        "portfolio_value": "4",
        "pattern_day_trader": true,
        "trading_blocked": false,
        "transfers_blocked": false,
        "account_blocked": false,
        "trade_suspended_by_user": false,
        "created_at": "2018-10-01T13:35:25Z"
    }"#;

    #[test]
    fn deserializes_account_snapshot() {
        let account: Account = serde_json::from_str(BODY).unwrap();
        assert_eq!(account.status, AccountStatus::Active);
        assert_eq!(account.currency, "USD");
        assert_eq!(account.buying_power, Decimal::ONE);
        assert_eq!(account.cash_withdrawable, Some(Decimal::from(3)));
        assert!(account.equity.is_none());
    }

    #[test]
    fn round_trips_structurally() {
        let account: Account = serde_json::from_str(BODY).unwrap();
        let json = serde_json::to_string(&account).unwrap();
        let again: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(account, again);
    }
}
