//! Price identifier decoding.
//!
//! EMP contracts store the name of their price feed as a `bytes32` word: the
//! UTF-8 identifier (e.g. `ETH/BTC`) left-aligned and padded with NUL bytes.

use alloy::primitives::B256;
use emp_common::error::AppError;

/// Decode a price identifier for display.
///
/// Takes the bytes up to the first NUL and decodes them lossily, so any word
/// yields a label.
pub fn decode_price_identifier(identifier: &B256) -> String {
    let bytes = identifier.as_slice();
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Strictly decode a null-terminated `bytes32` string.
///
/// The final byte must be NUL and the content must be valid UTF-8.
pub fn parse_bytes32_string(identifier: &B256) -> Result<String, AppError> {
    let bytes = identifier.as_slice();
    if bytes[31] != 0 {
        return Err(AppError::Decode(
            "invalid bytes32 string - no null terminator".to_string(),
        ));
    }

    let end = bytes.iter().position(|b| *b == 0).unwrap_or(31);
    std::str::from_utf8(&bytes[..end])
        .map(str::to_string)
        .map_err(|e| AppError::Decode(format!("invalid UTF-8 in bytes32 string: {e}")))
}

/// Encode an identifier into its null-padded `bytes32` form.
pub fn format_bytes32_string(text: &str) -> Result<B256, AppError> {
    let bytes = text.as_bytes();
    if bytes.len() > 31 {
        return Err(AppError::Decode(format!(
            "bytes32 string must be less than 32 bytes, got {}",
            bytes.len()
        )));
    }

    let mut word = [0u8; 32];
    word[..bytes.len()].copy_from_slice(bytes);
    Ok(B256::from(word))
}

/// Parse a price identifier given either as a `0x`-prefixed 32-byte hex word
/// or as the plain identifier text.
pub fn parse_price_identifier(raw: &str) -> Result<B256, AppError> {
    let raw = raw.trim();

    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))
        && hex.len() == 64
    {
        let bytes = alloy::hex::decode(hex)
            .map_err(|e| AppError::Decode(format!("invalid price identifier hex: {e}")))?;
        let word: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AppError::Decode("price identifier must be 32 bytes".to_string()))?;
        return Ok(B256::from(word));
    }

    format_bytes32_string(raw)
}
