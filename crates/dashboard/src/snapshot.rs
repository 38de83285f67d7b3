//! Provider snapshot files.
//!
//! A snapshot is the JSON dump of every provider the sponsor panel reads:
//!
//! ```json
//! {
//!   "emp_state": { "price_identifier": "ETH/BTC" },
//!   "collateral": { "symbol": "WETH" },
//!   "active_sponsors": { "0x…": { "collateral": "12.5", "tokensOutstanding": "100", "cRatio": "1.8", "liquidationPrice": "101" } },
//!   "price_feed": { "latest_price": 240.5 },
//!   "token": { "symbol": "ETHBTC-FEB21" }
//! }
//! ```
//!
//! Every section and field may be missing or `null` while providers load.

use serde::Deserialize;

use emp_common::error::AppError;
use emp_common::types::{MonitorSnapshot, PriceContext, SponsorSet};
use emp_decoders::identifier::parse_price_identifier;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SnapshotFile {
    pub emp_state: Option<EmpStateSection>,
    pub collateral: Option<TokenSection>,
    pub active_sponsors: Option<SponsorSet>,
    pub price_feed: Option<PriceFeedSection>,
    pub token: Option<TokenSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmpStateSection {
    /// bytes32 hex word or plain identifier text
    pub price_identifier: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenSection {
    pub symbol: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PriceFeedSection {
    pub latest_price: Option<f64>,
}

impl SnapshotFile {
    /// Convert the file sections into the snapshot handed to the view.
    pub fn into_snapshot(self) -> Result<MonitorSnapshot, AppError> {
        let price_identifier = self
            .emp_state
            .and_then(|state| state.price_identifier)
            .map(|raw| parse_price_identifier(&raw))
            .transpose()?;

        Ok(MonitorSnapshot {
            active_sponsors: self.active_sponsors,
            price: PriceContext {
                price_identifier,
                latest_price: self.price_feed.and_then(|feed| feed.latest_price),
                token_symbol: self.token.and_then(|token| token.symbol),
            },
            collateral_symbol: self.collateral.and_then(|collateral| collateral.symbol),
        })
    }
}

/// Parse snapshot JSON.
pub fn parse_snapshot(bytes: &[u8]) -> Result<MonitorSnapshot, AppError> {
    let file: SnapshotFile = serde_json::from_slice(bytes)?;
    file.into_snapshot()
}
