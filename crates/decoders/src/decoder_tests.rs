//! Cross-module decoder tests: identifiers as stored by deployed EMPs,
//! registry output as the sponsor registry formats it, and property checks on
//! numeric coercion.

use alloy::primitives::B256;
use proptest::prelude::*;

use emp_common::types::FieldValue;

use crate::identifier::{
    decode_price_identifier, format_bytes32_string, parse_bytes32_string, parse_price_identifier,
};
use crate::numeric::{parse_decimal, to_fixed, to_number};
use crate::pricefeed::{InversionPredicate, PriceFeedRegistry};

// ───────────────────────────── helpers ──────────────────────────────

/// Null-pad an identifier by hand, the way the contract stores it.
fn padded(identifier: &str) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[..identifier.len()].copy_from_slice(identifier.as_bytes());
    B256::from(bytes)
}

// ═══════════════════════════════════════════════════════════════════
//  Price identifiers
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_known_identifiers_decode() {
    for identifier in ["ETH/BTC", "COMPUSD", "USDETH", "GASETH-TWAP-1Mx1M"] {
        let word = padded(identifier);
        assert_eq!(decode_price_identifier(&word), identifier);
        assert_eq!(parse_bytes32_string(&word).unwrap(), identifier);
    }
}

#[test]
fn test_zero_word_decodes_empty() {
    assert_eq!(decode_price_identifier(&B256::ZERO), "");
    assert_eq!(parse_bytes32_string(&B256::ZERO).unwrap(), "");
}

#[test]
fn test_invalid_utf8_is_lossy_for_display_but_rejected_strictly() {
    let mut bytes = [0u8; 32];
    bytes[0] = 0xff;
    bytes[1] = b'X';
    let word = B256::from(bytes);

    assert_eq!(decode_price_identifier(&word), "\u{fffd}X");
    assert!(parse_bytes32_string(&word).is_err());
}

#[test]
fn test_hex_and_plain_forms_agree() {
    let from_plain = parse_price_identifier("ETH/BTC").unwrap();
    let hex = format!("{from_plain:#x}");
    let from_hex = parse_price_identifier(&hex).unwrap();
    assert_eq!(from_plain, from_hex);
    assert_eq!(from_plain, format_bytes32_string("ETH/BTC").unwrap());
}

#[test]
fn test_short_hex_is_treated_as_text() {
    // Not a full word, so it is encoded as the literal identifier text
    let word = parse_price_identifier("0x1234").unwrap();
    assert_eq!(decode_price_identifier(&word), "0x1234");
}

// ═══════════════════════════════════════════════════════════════════
//  Registry-formatted amounts
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_registry_formatted_amounts() {
    // The sponsor registry formats wei amounts with `formatUnits`
    assert_eq!(to_number(&FieldValue::from("1500.0")), 1500.0);
    assert_eq!(to_number(&FieldValue::from("0.000000000000000001")), 1e-18);
    assert_eq!(to_number(&FieldValue::from("1.8542")), 1.8542);
}

#[test]
fn test_series_formatting_of_registry_amounts() {
    assert_eq!(to_fixed(to_number(&FieldValue::from("12.3456")), 2), "12.35");
    assert_eq!(to_fixed(to_number(&FieldValue::from("abc")), 2), "NaN");
    assert_eq!(to_fixed(to_number(&FieldValue::from("")), 2), "0.00");
}

// ═══════════════════════════════════════════════════════════════════
//  Inversion
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_registry_as_trait_object() {
    let predicate: Box<dyn InversionPredicate> = Box::new(PriceFeedRegistry::new());
    assert!(predicate.is_inverted(Some("yUSD-OCT20")));
    assert!(!predicate.is_inverted(Some("yCOMP-1220")));
}

// ═══════════════════════════════════════════════════════════════════
//  Properties
// ═══════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn prop_plain_decimals_parse_exactly(value in -1.0e12f64..1.0e12f64) {
        let text = value.to_string();
        prop_assert_eq!(parse_decimal(&text), value);
    }

    #[test]
    fn prop_surrounding_whitespace_ignored(value in 0u32..1_000_000u32) {
        let text = format!("  {value}\t");
        prop_assert_eq!(parse_decimal(&text), value as f64);
    }

    #[test]
    fn prop_alphabetic_suffix_is_nan(value in 1u32..1_000_000u32, suffix in "[a-df-zA-DF-Z]{1,4}") {
        let text = format!("{value}{suffix}");
        prop_assert!(parse_decimal(&text).is_nan());
    }

    #[test]
    fn prop_short_identifiers_decode(identifier in "[A-Z0-9/_-]{0,31}") {
        let word = format_bytes32_string(&identifier).unwrap();
        prop_assert_eq!(decode_price_identifier(&word), identifier.clone());
        prop_assert_eq!(parse_bytes32_string(&word).unwrap(), identifier);
    }

    #[test]
    fn prop_to_fixed_has_requested_decimals(value in -1.0e9f64..1.0e9f64, digits in 0usize..8) {
        let text = to_fixed(value, digits);
        let decimals = text.split('.').nth(1).map(str::len).unwrap_or(0);
        prop_assert_eq!(decimals, digits);
    }

    #[test]
    fn prop_to_fixed_is_nearest(value in -1.0e9f64..1.0e9f64, digits in 0usize..8) {
        let rendered = parse_decimal(&to_fixed(value, digits));
        let half_unit = 0.5 * 10f64.powi(-(digits as i32));
        prop_assert!((rendered - value).abs() <= half_unit + value.abs() * 1e-15);
    }

    #[test]
    fn prop_half_integers_round_up(n in 0u32..1_000_000) {
        let value = n as f64 + 0.5;
        prop_assert_eq!(to_fixed(value, 0), (n + 1).to_string());
        prop_assert_eq!(to_fixed(-value, 0), format!("-{}", n + 1));
    }

    #[test]
    fn prop_eighths_round_up_at_two_places(whole in 0u32..100_000, eighth in prop::sample::select(vec![1u32, 3, 5, 7])) {
        let value = whole as f64 + eighth as f64 / 8.0;
        let expected = whole as u64 * 100 + (eighth as u64 * 100 + 4) / 8;
        prop_assert_eq!(to_fixed(value, 2), format!("{}.{:02}", expected / 100, expected % 100));
    }
}
