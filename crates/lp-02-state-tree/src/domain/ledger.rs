use super::errors::TreeError;
use super::node::LeafKind;
use super::tree::StateTree;
use lp_01_binary_codec::{
    encode, encode_auto, transaction_id, CanonicalBuffer, HashPrefix, SchemaKind, Sha512Half,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::formats::Uppercase;
use serde_with::hex::Hex;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use shared_types::{Hash, LedgerIndex};
use tracing::debug;

// =============================================================================
// LEDGER HEADER
// =============================================================================

/// The fixed-size header that identifies a closed ledger.
///
/// JSON form follows the server's `ledger` response: `ledger_index` may be a
/// number or a decimal string, `total_coins` is a decimal string, hashes are
/// uppercase hex.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerHeader {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub ledger_index: LedgerIndex,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub total_coins: u64,
    #[serde_as(as = "Hex<Uppercase>")]
    pub parent_hash: Hash,
    #[serde_as(as = "Hex<Uppercase>")]
    pub transaction_hash: Hash,
    #[serde_as(as = "Hex<Uppercase>")]
    pub account_hash: Hash,
    pub parent_close_time: u32,
    pub close_time: u32,
    pub close_time_resolution: u8,
    #[serde(default)]
    pub close_flags: u8,
}

impl LedgerHeader {
    /// Digest of the header under the `LWR\0` prefix.
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha512Half::with_prefix(HashPrefix::LedgerMaster);
        hasher.update(&self.ledger_index.to_be_bytes());
        hasher.update(&self.total_coins.to_be_bytes());
        hasher.update(&self.parent_hash);
        hasher.update(&self.transaction_hash);
        hasher.update(&self.account_hash);
        hasher.update(&self.parent_close_time.to_be_bytes());
        hasher.update(&self.close_time.to_be_bytes());
        hasher.update(&[self.close_time_resolution, self.close_flags]);
        hasher.finalize()
    }
}

// =============================================================================
// TREE BUILDERS
// =============================================================================

/// Only protocol fields (capitalised names) go on the wire; helper keys such
/// as `hash`, `index` or `metaData` are dropped.
fn protocol_fields(object: &Map<String, Value>) -> Value {
    Value::Object(
        object
            .iter()
            .filter(|(name, _)| name.starts_with(|c: char| c.is_ascii_uppercase()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
    )
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, TreeError> {
    value.as_object().ok_or_else(|| TreeError::MalformedEntry {
        reason: format!("{what} is not an object"),
    })
}

fn parse_key(hex_str: &str) -> Result<Hash, TreeError> {
    let bytes = hex::decode(hex_str).map_err(|e| TreeError::MalformedEntry {
        reason: format!("bad index {hex_str}: {e}"),
    })?;
    Hash::try_from(bytes.as_slice()).map_err(|_| TreeError::MalformedEntry {
        reason: format!("index {hex_str} is not 32 bytes"),
    })
}

/// Build the transaction tree of a ledger.
///
/// Each transaction must carry its `metaData`. The key is the transaction id
/// and the leaf payload is `VL(tx) ‖ VL(meta)`.
pub fn transaction_tree(transactions: &[Value]) -> Result<StateTree, TreeError> {
    let mut tree = StateTree::new();
    for tx in transactions {
        let object = as_object(tx, "transaction")?;
        let meta = object
            .get("metaData")
            .ok_or_else(|| TreeError::MalformedEntry {
                reason: "transaction has no metaData".into(),
            })?;

        let tx_blob = encode_auto(&protocol_fields(object))?;
        let meta_blob = encode(SchemaKind::Metadata, &protocol_fields(as_object(meta, "metaData")?))?;

        let mut payload = CanonicalBuffer::new();
        payload.append_vl(tx_blob.as_bytes())?;
        payload.append_vl(meta_blob.as_bytes())?;

        tree.insert(
            transaction_id(tx_blob.as_bytes()),
            LeafKind::TransactionWithMeta,
            payload.into_bytes(),
        )?;
    }
    Ok(tree)
}

/// Build the account-state tree of a ledger.
///
/// The key comes from `index` (or `LedgerIndex`); neither is part of the
/// leaf payload.
pub fn account_state_tree(entries: &[Value]) -> Result<StateTree, TreeError> {
    let mut tree = StateTree::new();
    for entry in entries {
        let object = as_object(entry, "ledger entry")?;
        let key = object
            .get("index")
            .or_else(|| object.get("LedgerIndex"))
            .and_then(Value::as_str)
            .ok_or_else(|| TreeError::MalformedEntry {
                reason: "ledger entry has no index".into(),
            })?;

        let mut fields = protocol_fields(object);
        if let Value::Object(map) = &mut fields {
            map.remove("LedgerIndex");
        }
        let blob = encode_auto(&fields)?;
        tree.insert(parse_key(key)?, LeafKind::AccountState, blob.into_bytes())?;
    }
    Ok(tree)
}

pub fn transaction_tree_hash(transactions: &[Value]) -> Result<Hash, TreeError> {
    Ok(transaction_tree(transactions)?.digest())
}

pub fn account_state_hash(entries: &[Value]) -> Result<Hash, TreeError> {
    Ok(account_state_tree(entries)?.digest())
}

// =============================================================================
// LEDGER SNAPSHOT
// =============================================================================

/// A header plus whatever contents were fetched with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(flatten)]
    pub header: LedgerHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<Value>>,
    #[serde(default, rename = "accountState", skip_serializing_if = "Option::is_none")]
    pub account_state: Option<Vec<Value>>,
}

impl LedgerSnapshot {
    /// Recompute the tree digests that are available, check them against the
    /// header, then return the header hash.
    pub fn verified_hash(&self) -> Result<Hash, TreeError> {
        if let Some(transactions) = &self.transactions {
            check("transaction", self.header.transaction_hash, transaction_tree_hash(transactions)?)?;
        }
        if let Some(entries) = &self.account_state {
            check("account state", self.header.account_hash, account_state_hash(entries)?)?;
        }
        let hash = self.header.hash();
        debug!(
            "[lp-02] ledger {} verified: {}",
            self.header.ledger_index,
            hex::encode_upper(hash)
        );
        Ok(hash)
    }
}

fn check(tree: &'static str, expected: Hash, actual: Hash) -> Result<(), TreeError> {
    if expected == actual {
        Ok(())
    } else {
        Err(TreeError::HashMismatch {
            tree,
            expected: hex::encode_upper(expected),
            actual: hex::encode_upper(actual),
        })
    }
}
