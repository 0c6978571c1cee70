//! # Codec Errors
//!
//! Every codec error is local to the single encode/decode call that raised
//! it; no shared state is left behind.

use shared_types::AddressError;
use thiserror::Error;

/// Errors raised by the canonical object codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Required fields missing or fields outside the schema present.
    #[error("Schema violation for {kind}: missing {missing:?}, unknown {unknown:?}")]
    SchemaViolation {
        kind: String,
        missing: Vec<String>,
        unknown: Vec<String>,
    },

    /// Value does not fit the wire type.
    #[error("Value out of range for {field}: {reason}")]
    RangeError { field: String, reason: String },

    /// A read would run past the end of the buffer.
    #[error("Truncated buffer: needed {needed} bytes, {remaining} remaining")]
    TruncatedBuffer { needed: usize, remaining: usize },

    /// A field header has no entry in the field table.
    #[error("Unknown field code: type {type_code}, field {field_code}")]
    UnknownFieldCode { type_code: u8, field_code: u8 },

    /// Value has the wrong shape for its field (bad hex, wrong JSON type, ...).
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// The object kind could not be determined.
    #[error("Unknown object kind: {0}")]
    UnknownKind(String),
}

impl CodecError {
    pub(crate) fn range(field: &str, reason: impl Into<String>) -> Self {
        Self::RangeError {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn address(field: &str, err: AddressError) -> Self {
        Self::invalid(field, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CodecError::TruncatedBuffer {
            needed: 8,
            remaining: 3,
        };
        assert!(err.to_string().contains("needed 8"));

        let err = CodecError::range("Sequence", "negative");
        assert!(err.to_string().contains("Sequence"));

        let err = CodecError::UnknownFieldCode {
            type_code: 6,
            field_code: 99,
        };
        assert!(err.to_string().contains("field 99"));
    }
}
