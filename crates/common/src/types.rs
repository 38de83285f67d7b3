use std::collections::HashMap;
use std::fmt;

use alloy::primitives::B256;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A decimal amount as reported by the sponsor registry.
///
/// Position readers hand back either formatted decimal strings or plain JSON
/// numbers; both are accepted and kept verbatim until parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Whether the value counts as present.
    ///
    /// Mirrors the registry's truthiness rule: the number `0`, `NaN` and the
    /// empty string are treated as missing. The string `"0"` is present.
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Text(s) => !s.is_empty(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

/// A sponsor's open position as reported by the sponsor registry.
///
/// Every field is optional: the registry may still be resolving a position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorRecord {
    /// Posted collateral, in collateral token units
    pub collateral: Option<FieldValue>,
    /// Outstanding synthetic tokens
    pub tokens_outstanding: Option<FieldValue>,
    /// Collateral ratio
    pub c_ratio: Option<FieldValue>,
    /// Reference price at which the position becomes liquidatable
    pub liquidation_price: Option<FieldValue>,
}

impl SponsorRecord {
    /// Build a record with all four fields set.
    pub fn new(
        collateral: impl Into<FieldValue>,
        tokens_outstanding: impl Into<FieldValue>,
        c_ratio: impl Into<FieldValue>,
        liquidation_price: impl Into<FieldValue>,
    ) -> Self {
        Self {
            collateral: Some(collateral.into()),
            tokens_outstanding: Some(tokens_outstanding.into()),
            c_ratio: Some(c_ratio.into()),
            liquidation_price: Some(liquidation_price.into()),
        }
    }

    /// A record is complete when all four fields are present.
    pub fn is_complete(&self) -> bool {
        [
            &self.collateral,
            &self.tokens_outstanding,
            &self.c_ratio,
            &self.liquidation_price,
        ]
        .into_iter()
        .all(|field| matches!(field, Some(value) if value.is_present()))
    }
}

/// Sponsor address → position mapping, in the order the registry produced it.
///
/// Re-inserting an address replaces its record without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SponsorSet {
    entries: Vec<(String, Option<SponsorRecord>)>,
    /// address → position in `entries`
    index: HashMap<String, usize>,
}

impl SponsorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `address`.
    pub fn insert(&mut self, address: impl Into<String>, record: Option<SponsorRecord>) {
        let address = address.into();
        match self.index.get(&address) {
            Some(&position) => self.entries[position].1 = record,
            None => {
                self.index.insert(address.clone(), self.entries.len());
                self.entries.push((address, record));
            }
        }
    }

    pub fn get(&self, address: &str) -> Option<&SponsorRecord> {
        self.index
            .get(address)
            .and_then(|&position| self.entries[position].1.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&SponsorRecord>)> {
        self.entries.iter().map(|(a, r)| (a.as_str(), r.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Option<SponsorRecord>)> for SponsorSet {
    fn from_iter<I: IntoIterator<Item = (S, Option<SponsorRecord>)>>(iter: I) -> Self {
        let mut set = SponsorSet::new();
        for (address, record) in iter {
            set.insert(address, record);
        }
        set
    }
}

impl Serialize for SponsorSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (address, record) in &self.entries {
            map.serialize_entry(address, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SponsorSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SponsorSetVisitor;

        impl<'de> Visitor<'de> for SponsorSetVisitor {
            type Value = SponsorSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of sponsor address to position")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SponsorSet, A::Error> {
                let mut set = SponsorSet::new();
                while let Some((address, record)) =
                    access.next_entry::<String, Option<SponsorRecord>>()?
                {
                    set.insert(address, record);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SponsorSetVisitor)
    }
}

/// Reference-price inputs gathered from the contract, price feed and token providers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceContext {
    /// Null-padded bytes32 identifier of the contract's price feed
    pub price_identifier: Option<B256>,
    /// Most recent off-chain price
    pub latest_price: Option<f64>,
    /// Synthetic token symbol, used to decide whether the feed is inverted
    pub token_symbol: Option<String>,
}

/// A sponsor position prepared for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedSponsor {
    /// Shortened display address (`0x12...cdef`)
    pub address: String,
    /// Liquidation price rounded up to the bucket width
    pub bucket: f64,
    pub liquidation_price: f64,
    pub tokens_outstanding: f64,
    pub collateral: f64,
}

/// Everything the dashboard reads from its providers at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorSnapshot {
    /// Sponsor registry output; `None` until the registry has loaded
    pub active_sponsors: Option<SponsorSet>,
    /// Price identifier, latest price and token symbol
    pub price: PriceContext,
    /// Collateral token symbol
    pub collateral_symbol: Option<String>,
}
