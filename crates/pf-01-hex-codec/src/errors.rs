//! # Codec Errors

use thiserror::Error;

/// Rejected codec input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input had no digits at all.
    #[error("Empty decimal input")]
    Empty,

    /// Input contained something other than ASCII `0-9`.
    /// Negative numbers are rejected here too.
    #[error("Invalid decimal digit {found:?} at position {position}")]
    InvalidDigit {
        /// Offending character.
        found: char,
        /// Byte offset in the input.
        position: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_digit_names_position() {
        let err = CodecError::InvalidDigit {
            found: '-',
            position: 0,
        };
        assert!(err.to_string().contains("'-'"));
        assert!(err.to_string().contains("position 0"));
    }
}
