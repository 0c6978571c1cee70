//! # Digests
//!
//! SHA-512 truncated to its first 256 bits, optionally over a 4-byte
//! domain-separation prefix. Pure functions of their input.

use super::errors::CodecError;
use super::serializer::encode_auto;
use serde_json::Value;
use sha2::{Digest, Sha512};
use shared_types::{AccountId, Hash};

/// Domain-separation prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum HashPrefix {
    /// `TXN\0`: transaction id.
    TransactionId = 0x5458_4E00,
    /// `SND\0`: transaction-with-metadata tree leaf.
    TransactionNode = 0x534E_4400,
    /// `MLN\0`: account-state tree leaf.
    LeafNode = 0x4D4C_4E00,
    /// `MIN\0`: inner tree node.
    InnerNode = 0x4D49_4E00,
    /// `LWR\0`: ledger header.
    LedgerMaster = 0x4C57_5200,
    /// `STX\0`: single-signature signing data.
    TransactionSign = 0x5354_5800,
    /// `SMT\0`: multi-signature signing data.
    TransactionMultiSign = 0x534D_5400,
}

impl HashPrefix {
    pub fn to_bytes(self) -> [u8; 4] {
        (self as u32).to_be_bytes()
    }
}

/// Incremental SHA-512 half.
#[derive(Clone, Default)]
pub struct Sha512Half(Sha512);

impl Sha512Half {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: HashPrefix) -> Self {
        let mut hasher = Self::new();
        hasher.update(&prefix.to_bytes());
        hasher
    }

    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    pub fn finalize(self) -> Hash {
        let full = self.0.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&full[..32]);
        out
    }
}

/// SHA-512 half of `data`.
pub fn sha512_half(data: &[u8]) -> Hash {
    let mut hasher = Sha512Half::new();
    hasher.update(data);
    hasher.finalize()
}

/// Digest of `prefix ‖ bytes`.
pub fn digest(bytes: &[u8], prefix: Option<HashPrefix>) -> Hash {
    let mut hasher = match prefix {
        Some(p) => Sha512Half::with_prefix(p),
        None => Sha512Half::new(),
    };
    hasher.update(bytes);
    hasher.finalize()
}

/// Identifying hash of a signed transaction blob.
pub fn transaction_id(blob: &[u8]) -> Hash {
    digest(blob, Some(HashPrefix::TransactionId))
}

/// Fields excluded from the data a signature covers.
const NON_SIGNING_FIELDS: [&str; 2] = ["TxnSignature", "Signers"];

fn signing_data(tx: &Value) -> Result<Vec<u8>, CodecError> {
    let mut unsigned = tx.clone();
    if let Some(map) = unsigned.as_object_mut() {
        for field in NON_SIGNING_FIELDS {
            map.remove(field);
        }
    }
    Ok(encode_auto(&unsigned)?.into_bytes())
}

/// Hash a single signer signs.
pub fn signing_hash(tx: &Value) -> Result<Hash, CodecError> {
    Ok(digest(&signing_data(tx)?, Some(HashPrefix::TransactionSign)))
}

/// Hash one member of a multi-signing list signs.
pub fn multi_signing_hash(tx: &Value, signer: &AccountId) -> Result<Hash, CodecError> {
    let mut data = signing_data(tx)?;
    data.extend_from_slice(signer.as_bytes());
    Ok(digest(&data, Some(HashPrefix::TransactionMultiSign)))
}
