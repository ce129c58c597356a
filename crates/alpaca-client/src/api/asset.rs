//! Asset endpoints and entities.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::http::{HttpClient, Listenable, Request, ValueTransformer};

const ENDPOINT: &str = "/v2/assets";

/// Asset class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetClass {
    /// United States equities.
    #[serde(rename = "us_equity")]
    UsEquity,
}

impl AssetClass {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::UsEquity => "us_equity",
        }
    }
}

/// Asset status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    /// The asset is tradable through the API.
    Active,
    /// The asset is not currently tradable.
    Inactive,
}

impl AssetStatus {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// A tradable instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset id.
    pub id: String,

    /// Asset class.
    #[serde(rename = "class")]
    pub asset_class: AssetClass,

    /// Exchange the asset trades on.
    pub exchange: String,

    /// Ticker symbol.
    pub symbol: String,

    /// Asset status.
    pub status: AssetStatus,

    /// Whether the asset is tradable through the API.
    pub tradable: bool,
}

/// The assets API serves the master list of tradable instruments.
#[derive(Debug, Clone)]
pub struct AssetApi {
    http: Arc<HttpClient>,
}

impl AssetApi {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// List assets, optionally filtered by status and asset class.
    #[must_use]
    pub fn list(
        &self,
        status: Option<AssetStatus>,
        asset_class: Option<AssetClass>,
    ) -> Listenable<Vec<Asset>> {
        let mut builder = Request::get(ENDPOINT);
        if let Some(status) = status {
            builder = builder.query("status", status.as_str());
        }
        if let Some(asset_class) = asset_class {
            builder = builder.query("asset_class", asset_class.as_str());
        }
        self.http
            .execute(builder.build(), ValueTransformer::<Vec<Asset>>::new())
    }

    /// Retrieve a single asset by symbol or id.
    ///
    /// Resolves to [`ApiError::NotFound`](crate::ApiError::NotFound) when the
    /// symbol is unknown.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Listenable<Asset> {
        let request = Request::get(ENDPOINT).segment(symbol).build();
        self.http.execute(request, ValueTransformer::<Asset>::new())
    }
}
