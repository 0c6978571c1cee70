//! # Codec Service
//!
//! Stateless implementation of [`CodecApi`] over the domain functions.

use crate::domain::{self, CanonicalBuffer, CodecError, HashPrefix, SchemaKind};
use crate::ports::CodecApi;
use serde_json::Value;
use shared_types::Hash;
use tracing::trace;

/// The canonical binary codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl BinaryCodec {
    pub fn new() -> Self {
        Self
    }
}

impl CodecApi for BinaryCodec {
    fn encode(&self, kind: SchemaKind, value: &Value) -> Result<CanonicalBuffer, CodecError> {
        domain::encode(kind, value)
            .inspect_err(|e| trace!("[lp-01] encode {} failed: {}", kind, e))
    }

    fn encode_auto(&self, value: &Value) -> Result<CanonicalBuffer, CodecError> {
        domain::encode_auto(value).inspect_err(|e| trace!("[lp-01] encode failed: {}", e))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        domain::decode(bytes)
            .inspect_err(|e| trace!("[lp-01] decode of {} bytes failed: {}", bytes.len(), e))
    }

    fn digest(&self, bytes: &[u8], prefix: Option<HashPrefix>) -> Hash {
        domain::digest(bytes, prefix)
    }

    fn signing_hash(&self, tx: &Value) -> Result<Hash, CodecError> {
        domain::signing_hash(tx)
    }

    fn transaction_id(&self, blob: &[u8]) -> Hash {
        domain::transaction_id(blob)
    }
}
