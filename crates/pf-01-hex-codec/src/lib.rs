//! # PF-01 Hex Codec
//!
//! Renders on-chain identifiers, which arrive as decimal digit strings of
//! unbounded magnitude, as fixed-width lowercase hexadecimal.
//!
//! **Architecture:** pure function, no dependencies on other crates
//!
//! ```text
//! "256" --encode(width = 32)--> "0x00000000000000000000000000000100"
//! ```
//!
//! The conversion never materializes the number as a machine integer: it is
//! a digit-by-digit long division, so 39-digit uint128 ids and larger values
//! render exactly.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod codec;
mod errors;

pub use codec::{encode, encode_default, DEFAULT_WIDTH, REQUEST_ID_WIDTH};
pub use errors::CodecError;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
