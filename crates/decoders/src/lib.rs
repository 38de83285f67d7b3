//! Decoding of raw collaborator values: bytes32 price identifiers, decimal
//! amounts reported by the sponsor registry, and the token → price-feed
//! registry.

pub mod identifier;
pub mod numeric;
pub mod pricefeed;

#[cfg(test)]
mod decoder_tests;

pub use identifier::{decode_price_identifier, parse_price_identifier};
pub use numeric::{to_fixed, to_number};
pub use pricefeed::{InversionPredicate, PriceFeedParams, PriceFeedRegistry};
