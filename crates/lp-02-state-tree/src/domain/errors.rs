use lp_01_binary_codec::CodecError;
use thiserror::Error;

/// State tree errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The same key was inserted twice.
    #[error("Duplicate key: {key}")]
    DuplicateKey { key: String },

    /// A leaf payload could not be encoded.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// An input object lacks what the tree needs (key, metadata, ...).
    #[error("Malformed entry: {reason}")]
    MalformedEntry { reason: String },

    /// A recomputed tree digest disagrees with the header.
    #[error("{tree} hash mismatch: header {expected}, computed {actual}")]
    HashMismatch {
        tree: &'static str,
        expected: String,
        actual: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_message() {
        let err = TreeError::DuplicateKey { key: "AB".into() };
        assert!(err.to_string().contains("AB"));
    }

    #[test]
    fn test_codec_error_converts() {
        let err: TreeError = CodecError::UnknownKind("x".into()).into();
        assert!(matches!(err, TreeError::Codec(_)));
    }
}
