//! # Error Types
//!
//! Errors raised while parsing shared identifiers.

use thiserror::Error;

/// Errors that can occur when parsing an account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Base-58 decoding or checksum verification failed.
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Decoded payload has the wrong length.
    #[error("Invalid account id length: expected 20 bytes, got {length}")]
    InvalidLength { length: usize },

    /// Hex form could not be decoded.
    #[error("Invalid hex account id: {0}")]
    InvalidHex(String),
}
