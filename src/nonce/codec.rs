//! Digit substitution codec for the token's expiry field.
//!
//! Each decimal digit maps to one symbol of a fixed ten-symbol alphabet so the
//! expiry does not read as a number inside the token. The mapping is
//! order-preserving and one symbol per digit, so the encoded width equals the
//! decimal width.

use crate::nonce::error::NonceError;

/// Symbols for the digits `0` through `9`, in order.
pub const ALPHABET: [char; 10] = ['a', 'b', 'c', 'd', '$', 'f', 'g', 'h', '.', 'j'];

fn symbol_for(digit: char) -> Option<char> {
    digit
        .to_digit(10)
        .map(|d| ALPHABET[d as usize])
}

fn digit_for(symbol: char) -> Option<char> {
    ALPHABET
        .iter()
        .position(|&s| s == symbol)
        .and_then(|d| char::from_digit(d as u32, 10))
}

/// Maps every decimal digit in `digits` to its alphabet symbol.
///
/// Any character outside `0`-`9` is rejected rather than coerced.
///
/// ```rust
/// use action_nonce::codec;
///
/// assert_eq!(codec::encode_digits("4600").unwrap(), "$gaa");
/// assert!(codec::encode_digits("46-0").is_err());
/// ```
pub fn encode_digits(digits: &str) -> Result<String, NonceError> {
    digits
        .chars()
        .map(|c| {
            symbol_for(c)
                .ok_or_else(|| NonceError::FormatError(format!("not a decimal digit: {c:?}")))
        })
        .collect()
}

/// Inverse of [`encode_digits`].
pub fn decode_digits(symbols: &str) -> Result<String, NonceError> {
    symbols
        .chars()
        .map(|c| {
            digit_for(c)
                .ok_or_else(|| NonceError::FormatError(format!("unknown time symbol: {c:?}")))
        })
        .collect()
}

/// Encodes a Unix timestamp into a field of exactly `width` symbols.
///
/// The decimal form is zero-padded to `width` before substitution. Negative
/// values and values needing more than `width` digits are rejected.
pub fn encode_timestamp(value: i64, width: usize) -> Result<String, NonceError> {
    if value < 0 {
        return Err(NonceError::FormatError(format!(
            "negative timestamp {value} cannot be encoded"
        )));
    }
    let decimal = format!("{value:0width$}");
    if decimal.len() > width {
        return Err(NonceError::FormatError(format!(
            "timestamp {value} does not fit a {width}-digit time field"
        )));
    }
    encode_digits(&decimal)
}

/// Decodes a time field produced by [`encode_timestamp`].
pub fn decode_timestamp(field: &str) -> Result<i64, NonceError> {
    let decimal = decode_digits(field)?;
    decimal
        .parse::<i64>()
        .map_err(|e| NonceError::FormatError(format!("invalid time field: {e}")))
}
