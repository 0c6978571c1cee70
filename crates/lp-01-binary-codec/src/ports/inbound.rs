//! # Inbound Ports
//!
//! The API other components drive the codec through.

use crate::domain::{CanonicalBuffer, CodecError, HashPrefix, SchemaKind};
use serde_json::Value;
use shared_types::Hash;

/// Canonical object codec API.
pub trait CodecApi: Send + Sync {
    /// Encode against an explicit schema kind.
    fn encode(&self, kind: SchemaKind, value: &Value) -> Result<CanonicalBuffer, CodecError>;

    /// Encode, inferring the schema kind from the object itself.
    fn encode_auto(&self, value: &Value) -> Result<CanonicalBuffer, CodecError>;

    /// Decode a top-level object.
    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError>;

    /// Digest of `prefix ‖ bytes`.
    fn digest(&self, bytes: &[u8], prefix: Option<HashPrefix>) -> Hash;

    /// Hash covered by a single signature.
    fn signing_hash(&self, tx: &Value) -> Result<Hash, CodecError>;

    /// Identifying hash of a signed blob.
    fn transaction_id(&self, blob: &[u8]) -> Hash;
}
