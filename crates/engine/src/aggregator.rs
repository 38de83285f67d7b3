//! Sponsor risk aggregator — turns the sponsor registry into a liquidation-price histogram.
//!
//! Pipeline:
//! 1. Keep only complete sponsor records
//! 2. Sort ascending by liquidation price (stable)
//! 3. Shorten addresses, bucket liquidation prices, parse amounts
//! 4. Normalize the reference price (decode identifier, apply inversion)
//! 5. Derive the chart configuration
//!
//! The aggregator is pure: every call recomputes from its inputs. Malformed
//! amounts become `NaN` and are charted as-is.

use std::cmp::Ordering;

use alloy::primitives::B256;

use emp_common::types::{AggregatedSponsor, FieldValue, PriceContext, SponsorRecord, SponsorSet};
use emp_decoders::identifier::decode_price_identifier;
use emp_decoders::numeric::{parse_decimal, to_fixed, to_number};
use emp_decoders::pricefeed::{InversionPredicate, PriceFeedRegistry};

use crate::chart::{ChartSpec, build_chart};

/// Width of a liquidation-price bucket.
pub const BUCKET_WIDTH: f64 = 5.0;
/// Decimals kept in the displayed reference price.
pub const PRICE_DECIMALS: usize = 6;

/// Outcome of an aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// All inputs were available
    Ready(ChartSpec),
    /// Sponsors, latest price or price identifier not yet available
    NotReady,
}

impl Aggregation {
    pub fn chart(&self) -> Option<&ChartSpec> {
        match self {
            Aggregation::Ready(chart) => Some(chart),
            Aggregation::NotReady => None,
        }
    }
}

/// The reference price as shown on the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePrice {
    /// Decoded price identifier (e.g. `ETH/BTC`)
    pub identifier: String,
    /// Price rendered with `PRICE_DECIMALS` decimals
    pub display: String,
    /// `display` parsed back, so chart placement matches the label exactly
    pub value: f64,
}

/// Sponsor risk aggregator, parameterized by the price inversion rule.
pub struct SponsorRiskAggregator<P = PriceFeedRegistry> {
    inversion: P,
}

impl<P: InversionPredicate> SponsorRiskAggregator<P> {
    pub fn new(inversion: P) -> Self {
        Self { inversion }
    }

    /// Build the sponsor histogram chart.
    ///
    /// Returns `NotReady` when `sponsors`, the latest price or the price
    /// identifier is absent.
    pub fn aggregate(
        &self,
        sponsors: Option<&SponsorSet>,
        price: &PriceContext,
        collateral_symbol: &str,
        log_scale: bool,
    ) -> Aggregation {
        let (Some(sponsors), Some(latest_price), Some(identifier)) =
            (sponsors, price.latest_price, price.price_identifier.as_ref())
        else {
            tracing::debug!(
                has_sponsors = sponsors.is_some(),
                has_latest_price = price.latest_price.is_some(),
                has_price_identifier = price.price_identifier.is_some(),
                "Sponsor risk inputs not ready"
            );
            return Aggregation::NotReady;
        };

        let inverted = self.inversion.is_inverted(price.token_symbol.as_deref());
        let reference = normalize_price(identifier, latest_price, inverted);
        let aggregated = collect_sponsors(sponsors);
        let chart = build_chart(&aggregated, &reference, collateral_symbol, log_scale);

        tracing::debug!(
            sponsors = aggregated.len(),
            reference_price = %reference.display,
            inverted,
            log_scale,
            "Built sponsor risk chart"
        );

        Aggregation::Ready(chart)
    }
}

impl Default for SponsorRiskAggregator<PriceFeedRegistry> {
    fn default() -> Self {
        Self::new(PriceFeedRegistry::new())
    }
}

/// Filter, sort and transform the sponsor set (steps 1–3).
pub fn collect_sponsors(sponsors: &SponsorSet) -> Vec<AggregatedSponsor> {
    let mut complete: Vec<(&str, &SponsorRecord, f64)> = sponsors
        .iter()
        .filter_map(|(address, record)| {
            let record = record.filter(|r| r.is_complete())?;
            Some((address, record, field_number(&record.liquidation_price)))
        })
        .collect();

    // `sort_by` is stable: equal prices keep registry order
    complete.sort_by(|a, b| compare_prices(a.2, b.2));

    complete
        .into_iter()
        .map(|(address, record, liquidation_price)| AggregatedSponsor {
            address: shorten_address(address),
            bucket: bucket_for(liquidation_price),
            liquidation_price,
            tokens_outstanding: field_number(&record.tokens_outstanding),
            collateral: field_number(&record.collateral),
        })
        .collect()
}

/// Ascending price order; `NaN` sorts after every number and equals itself.
fn compare_prices(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn field_number(field: &Option<FieldValue>) -> f64 {
    field.as_ref().map(to_number).unwrap_or(f64::NAN)
}

/// Shorten an address to its first and last four characters.
///
/// Addresses shorter than eight characters overlap rather than fail.
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(4).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{head}...{tail}")
}

/// Round a liquidation price up to the next bucket boundary.
pub fn bucket_for(liquidation_price: f64) -> f64 {
    (liquidation_price / BUCKET_WIDTH).ceil() * BUCKET_WIDTH
}

/// Decode the identifier and compute the displayed reference price (step 4).
///
/// An inverted feed shows `1 / latest_price`, unless the price is not positive.
pub fn normalize_price(identifier: &B256, latest_price: f64, inverted: bool) -> ReferencePrice {
    let price = if inverted && latest_price > 0.0 {
        1.0 / latest_price
    } else {
        latest_price
    };

    let display = to_fixed(price, PRICE_DECIMALS);
    let value = parse_decimal(&display);

    ReferencePrice {
        identifier: decode_price_identifier(identifier),
        display,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emp_decoders::identifier::format_bytes32_string;

    fn identifier() -> B256 {
        format_bytes32_string("ETH/BTC").unwrap()
    }

    fn price_context(latest_price: f64) -> PriceContext {
        PriceContext {
            price_identifier: Some(identifier()),
            latest_price: Some(latest_price),
            token_symbol: Some("ETHBTC-FEB21".to_string()),
        }
    }

    #[test]
    fn test_shorten_address() {
        assert_eq!(shorten_address("0x1234567890abcdef"), "0x12...cdef");
    }

    #[test]
    fn test_shorten_short_address_overlaps() {
        assert_eq!(shorten_address("0xabcd"), "0xab...abcd");
        assert_eq!(shorten_address("ab"), "ab...ab");
        assert_eq!(shorten_address(""), "...");
    }

    #[test]
    fn test_bucket_rounds_up() {
        assert_eq!(bucket_for(101.0), 105.0);
        assert_eq!(bucket_for(100.0), 100.0);
        assert_eq!(bucket_for(0.0), 0.0);
        assert_eq!(bucket_for(104.999), 105.0);
        assert!(bucket_for(f64::NAN).is_nan());
    }

    #[test]
    fn test_normalize_inverted_price() {
        let reference = normalize_price(&identifier(), 2.0, true);
        assert_eq!(reference.display, "0.500000");
        assert_eq!(reference.value, 0.5);
        assert_eq!(reference.identifier, "ETH/BTC");
    }

    #[test]
    fn test_normalize_keeps_non_positive_price() {
        let reference = normalize_price(&identifier(), 0.0, true);
        assert_eq!(reference.display, "0.000000");
        assert_eq!(reference.value, 0.0);

        let reference = normalize_price(&identifier(), -4.0, true);
        assert_eq!(reference.value, -4.0);
    }

    #[test]
    fn test_normalize_truncates_to_six_decimals() {
        let reference = normalize_price(&identifier(), 3.0, true);
        assert_eq!(reference.display, "0.333333");
        assert_eq!(reference.value, 0.333333);
    }

    #[test]
    fn test_collect_filters_incomplete_records() {
        let mut sponsors = SponsorSet::new();
        sponsors.insert("0xaaaa1111aaaa1111", Some(SponsorRecord::new("10", "100", "1.5", "120")));
        sponsors.insert("0xbbbb2222bbbb2222", None);
        sponsors.insert(
            "0xcccc3333cccc3333",
            Some(SponsorRecord {
                c_ratio: None,
                ..SponsorRecord::new("10", "100", "1.5", "120")
            }),
        );
        sponsors.insert("0xdddd4444dddd4444", Some(SponsorRecord::new("10", "100", "1.5", "")));

        let collected = collect_sponsors(&sponsors);
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].address, "0xaa...1111");
    }

    #[test]
    fn test_collect_sorts_stably() {
        let mut sponsors = SponsorSet::new();
        sponsors.insert("0xfirst-equal-0001", Some(SponsorRecord::new("1", "1", "1", "150")));
        sponsors.insert("0xlowest-price-002", Some(SponsorRecord::new("2", "1", "1", "110")));
        sponsors.insert("0xsecond-equal-003", Some(SponsorRecord::new("3", "1", "1", "150")));

        let collected = collect_sponsors(&sponsors);
        let collateral: Vec<f64> = collected.iter().map(|s| s.collateral).collect();
        assert_eq!(collateral, vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_collect_keeps_nan_amounts() {
        let mut sponsors = SponsorSet::new();
        sponsors.insert("0xnan0000000000nan", Some(SponsorRecord::new("lots", "1", "1", "abc")));
        sponsors.insert("0xnum0000000000num", Some(SponsorRecord::new("5", "1", "1", "120")));

        let collected = collect_sponsors(&sponsors);
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].liquidation_price, 120.0);
        assert!(collected[1].liquidation_price.is_nan());
        assert!(collected[1].bucket.is_nan());
        assert!(collected[1].collateral.is_nan());
    }

    #[test]
    fn test_not_ready_without_inputs() {
        let aggregator: SponsorRiskAggregator = SponsorRiskAggregator::default();
        let sponsors = SponsorSet::new();

        assert_eq!(
            aggregator.aggregate(None, &price_context(1.0), "WETH", false),
            Aggregation::NotReady
        );

        let no_identifier = PriceContext {
            price_identifier: None,
            ..price_context(1.0)
        };
        assert_eq!(
            aggregator.aggregate(Some(&sponsors), &no_identifier, "WETH", false),
            Aggregation::NotReady
        );

        let no_price = PriceContext {
            latest_price: None,
            ..price_context(1.0)
        };
        assert!(aggregator.aggregate(Some(&sponsors), &no_price, "WETH", false).chart().is_none());
    }

    #[test]
    fn test_empty_sponsor_set_is_ready() {
        let aggregator: SponsorRiskAggregator = SponsorRiskAggregator::default();
        let result = aggregator.aggregate(Some(&SponsorSet::new()), &price_context(200.0), "WETH", false);
        let chart = result.chart().unwrap();
        assert!(chart.series[0].data.is_empty());
        assert_eq!(chart.options.xaxis.max, 210.0);
    }

    #[test]
    fn test_inversion_from_predicate() {
        let aggregator = SponsorRiskAggregator::new(|symbol: Option<&str>| symbol == Some("INV"));
        let price = PriceContext {
            token_symbol: Some("INV".to_string()),
            ..price_context(4.0)
        };

        let result = aggregator.aggregate(Some(&SponsorSet::new()), &price, "WETH", false);
        let chart = result.chart().unwrap();
        assert_eq!(chart.options.annotations.xaxis[0].x, 0.25);
    }
}
