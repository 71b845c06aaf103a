//! # Decimal → Hex Long Division

use crate::errors::CodecError;

/// Width used when the caller does not ask for one.
pub const DEFAULT_WIDTH: usize = 1;

/// Display width of request ids (uint128 = 32 hex digits).
pub const REQUEST_ID_WIDTH: usize = 32;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Encode a decimal digit string as `0x`-prefixed lowercase hex, left-padded
/// with zeros to at least `width` digits.
///
/// `width` is a minimum, never a cap: values needing more digits render in
/// full. A zero value renders as `width` zeros (at least one).
///
/// # Errors
///
/// `CodecError::Empty` for an empty string, `CodecError::InvalidDigit` for
/// any byte outside `0-9`.
pub fn encode(decimal: &str, width: usize) -> Result<String, CodecError> {
    if decimal.is_empty() {
        return Err(CodecError::Empty);
    }

    // Base-16 accumulator, least significant digit first.
    let mut acc: Vec<u8> = Vec::with_capacity(decimal.len());

    for (position, byte) in decimal.bytes().enumerate() {
        if !byte.is_ascii_digit() {
            return Err(CodecError::InvalidDigit {
                found: char::from(byte),
                position,
            });
        }

        // acc = acc * 10 + digit
        let mut carry = u32::from(byte - b'0');
        let mut i = 0;
        while carry != 0 || i < acc.len() {
            if i < acc.len() {
                carry += u32::from(acc[i]) * 10;
            }
            // carry < 16 * 10 + 10, so both casts are lossless
            let digit = (carry % 16) as u8;
            if i < acc.len() {
                acc[i] = digit;
            } else {
                acc.push(digit);
            }
            carry /= 16;
            i += 1;
        }
    }

    let width = width.max(1);
    let padding = width.saturating_sub(acc.len());

    let mut out = String::with_capacity(2 + padding + acc.len());
    out.push_str("0x");
    out.extend(std::iter::repeat('0').take(padding));
    out.extend(acc.iter().rev().map(|&d| char::from(HEX_DIGITS[usize::from(d)])));
    Ok(out)
}

/// `encode` with `DEFAULT_WIDTH`.
pub fn encode_default(decimal: &str) -> Result<String, CodecError> {
    encode(decimal, DEFAULT_WIDTH)
}
