//! # Core Entities
//!
//! Identifiers shared across the codec, the state tree and the submission
//! manager.

use crate::errors::AddressError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 256-bit digest (SHA-512 half).
pub type Hash = [u8; 32];

/// The all-zero digest. Empty trees and absent children digest to this.
pub const ZERO_HASH: Hash = [0u8; 32];

/// A closed-ledger sequence number.
pub type LedgerIndex = u32;

/// Version byte prefixed to account ids before base-58 check encoding.
const ACCOUNT_ID_VERSION: u8 = 0;

/// A 160-bit account identifier.
///
/// Stored as raw bytes; rendered as a base-58 check address using the
/// network's alphabet.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    /// Decode a base-58 check address (e.g. `rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh`).
    pub fn from_address(address: &str) -> Result<Self, AddressError> {
        let decoded = bs58::decode(address)
            .with_alphabet(bs58::Alphabet::RIPPLE)
            .with_check(Some(ACCOUNT_ID_VERSION))
            .into_vec()
            .map_err(|e| AddressError::InvalidAddress {
                address: address.to_string(),
                reason: e.to_string(),
            })?;

        // Checked decoding keeps the version byte in front of the payload.
        let payload = match decoded.len() {
            21 => &decoded[1..],
            20 => &decoded[..],
            length => return Err(AddressError::InvalidLength { length }),
        };

        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(payload);
        Ok(Self(bytes))
    }

    /// Decode a 40-digit hex account id.
    pub fn from_hex(value: &str) -> Result<Self, AddressError> {
        let raw = hex::decode(value).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&raw)
    }

    /// Build from a byte slice of exactly 20 bytes.
    pub fn from_slice(raw: &[u8]) -> Result<Self, AddressError> {
        let bytes: [u8; 20] = raw
            .try_into()
            .map_err(|_| AddressError::InvalidLength { length: raw.len() })?;
        Ok(Self(bytes))
    }

    /// Render as a base-58 check address.
    pub fn to_address(&self) -> String {
        bs58::encode(self.0)
            .with_alphabet(bs58::Alphabet::RIPPLE)
            .with_check_version(ACCOUNT_ID_VERSION)
            .into_string()
    }

    /// Uppercase hex of the raw id.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = AddressError;

    /// Accepts either the base-58 address or the 40-digit hex form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 40 && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Self::from_hex(s)
        } else {
            Self::from_address(s)
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_address())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_address())
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_address())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
