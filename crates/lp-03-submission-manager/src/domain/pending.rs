use super::entities::{EntryId, EntryState, Summary, TransactionResult, ValidatedTransaction};
use lru::LruCache;
use serde_json::{Map, Value};
use shared_types::{Hash, LedgerIndex};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;

/// A `UInt32` field in any form the codec accepts: a number, or a decimal
/// string whose fraction is dropped.
fn uint32(value: &Value) -> Option<u32> {
    let whole = match value {
        Value::Number(n) => match n.as_u64() {
            Some(v) => v,
            None => {
                let f = n.as_f64()?.trunc();
                if !(0.0..=f64::from(u32::MAX)).contains(&f) {
                    return None;
                }
                f as u64
            }
        },
        Value::String(s) => {
            let digits = s.split_once('.').map_or(s.as_str(), |(w, _)| w);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok()?
        }
        _ => return None,
    };
    u32::try_from(whole).ok()
}

// =============================================================================
// PENDING ENTRY
// =============================================================================

/// A transaction plus its submission bookkeeping.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub(crate) id: EntryId,
    pub(crate) client_id: Option<String>,
    pub(crate) tx_json: Map<String, Value>,
    pub(crate) secret: Option<String>,
    pub(crate) state: EntryState,
    /// Caller supplied the fee; load changes leave it alone.
    pub(crate) fixed_fee: bool,
    /// Caller supplied the sequence.
    pub(crate) pinned_sequence: bool,
    pub(crate) resubmittable: bool,
    /// Caller gave up on the entry; nothing is retried any more.
    pub(crate) aborted: bool,
    pub(crate) multisigned: bool,
    pub(crate) sequence: Option<u32>,
    pub(crate) last_ledger: Option<LedgerIndex>,
    pub(crate) attempts: u32,
    pub(crate) submit_index: Option<LedgerIndex>,
    pub(crate) initial_submit_index: Option<LedgerIndex>,
    /// Newest first, no duplicates.
    pub(crate) submitted_ids: Vec<Hash>,
    /// Signing hash and signature of the last local signing.
    pub(crate) signature: Option<(Hash, String)>,
    /// Attempt whose reply or timeout is still outstanding.
    pub(crate) awaiting_reply: Option<u32>,
    /// Load rose above the maximum fee; fail at the next dispatch.
    pub(crate) fee_over_max: Option<u64>,
    pub(crate) missing_signalled: bool,
    pub(crate) lost_signalled: bool,
    pub(crate) result: Option<TransactionResult>,
    pub(crate) finalized: bool,
}

impl PendingEntry {
    pub(crate) fn new(id: EntryId, tx_json: Map<String, Value>) -> Self {
        let fixed_fee = tx_json.contains_key("Fee");
        let multisigned = tx_json.contains_key("Signers");
        let sequence = tx_json.get("Sequence").and_then(uint32);
        let last_ledger = tx_json.get("LastLedgerSequence").and_then(uint32);
        Self {
            id,
            client_id: None,
            tx_json,
            secret: None,
            state: EntryState::Unsubmitted,
            fixed_fee,
            pinned_sequence: sequence.is_some(),
            resubmittable: !multisigned,
            aborted: false,
            multisigned,
            sequence,
            last_ledger,
            attempts: 0,
            submit_index: None,
            initial_submit_index: None,
            submitted_ids: Vec::new(),
            signature: None,
            awaiting_reply: None,
            fee_over_max: None,
            missing_signalled: false,
            lost_signalled: false,
            result: None,
            finalized: false,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub fn sequence(&self) -> Option<u32> {
        self.sequence
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn tx_json(&self) -> &Map<String, Value> {
        &self.tx_json
    }

    pub fn fee(&self) -> Option<u64> {
        match self.tx_json.get("Fee")? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub(crate) fn record_id(&mut self, hash: Hash) {
        self.submitted_ids.retain(|h| *h != hash);
        self.submitted_ids.insert(0, hash);
    }

    pub fn summary(&self) -> Summary {
        Summary {
            tx_json: Value::Object(self.tx_json.clone()),
            client_id: self.client_id.clone(),
            submitted_ids: self.submitted_ids.iter().map(hex::encode_upper).collect(),
            submission_attempts: self.attempts,
            sequence: self.sequence,
            fee: self.fee().map(|f| f.to_string()),
            submit_index: self.submit_index,
            initial_submit_index: self.initial_submit_index,
            last_ledger_sequence: self.last_ledger,
            state: self.state.as_str(),
            finalized: self.finalized,
            result: self.result.clone(),
        }
    }
}

// =============================================================================
// PENDING SET
// =============================================================================

/// In-flight entries of one account plus what it has recently seen
/// validated.
pub struct PendingSet {
    entries: BTreeMap<EntryId, PendingEntry>,
    validated_sequences: LruCache<u32, ()>,
    received: LruCache<Hash, ValidatedTransaction>,
}

impl PendingSet {
    pub fn new(cache_capacity: NonZeroUsize) -> Self {
        Self {
            entries: BTreeMap::new(),
            validated_sequences: LruCache::new(cache_capacity),
            received: LruCache::new(cache_capacity),
        }
    }

    pub fn insert(&mut self, entry: PendingEntry) {
        self.entries.insert(entry.id, entry);
    }

    pub fn get(&self, id: EntryId) -> Option<&PendingEntry> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntryId) -> Option<&mut PendingEntry> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut PendingEntry> {
        self.entries.values_mut()
    }

    pub fn remove(&mut self, id: EntryId) -> Option<PendingEntry> {
        self.entries.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry ids in submission order.
    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingEntry> {
        self.entries.values()
    }

    pub fn find_by_client_id(&self, client_id: &str) -> Option<&PendingEntry> {
        self.iter().find(|e| e.client_id.as_deref() == Some(client_id))
    }

    pub fn find_by_transaction_id(&self, hash: &Hash) -> Option<&PendingEntry> {
        self.iter().find(|e| e.submitted_ids.contains(hash))
    }

    /// Another live entry already holds `sequence`.
    pub fn sequence_in_use(&self, sequence: u32, except: EntryId) -> bool {
        self.iter()
            .any(|e| e.id != except && !e.finalized && e.sequence == Some(sequence))
    }

    /// Lowest ledger any entry was first submitted in.
    pub fn min_initial_submit_index(&self) -> Option<LedgerIndex> {
        self.iter().filter_map(|e| e.initial_submit_index).min()
    }

    pub fn mark_sequence_validated(&mut self, sequence: u32) {
        self.validated_sequences.put(sequence, ());
    }

    pub fn is_sequence_validated(&self, sequence: u32) -> bool {
        self.validated_sequences.contains(&sequence)
    }

    pub fn record_received(&mut self, tx: ValidatedTransaction) {
        self.received.put(tx.hash, tx);
    }

    /// First of `ids` the network has already reported.
    pub fn received_any(&self, ids: &[Hash]) -> Option<&ValidatedTransaction> {
        ids.iter().find_map(|id| self.received.peek(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_types::AccountId;

    fn entry(id: EntryId, tx: Value) -> PendingEntry {
        PendingEntry::new(id, tx.as_object().cloned().unwrap_or_default())
    }

    fn set() -> PendingSet {
        PendingSet::new(NonZeroUsize::new(2).unwrap())
    }

    #[test]
    fn test_entry_reads_pinned_fields() {
        let e = entry(1, json!({"Fee": "12", "Sequence": 7, "LastLedgerSequence": 30}));
        assert!(e.fixed_fee);
        assert!(e.pinned_sequence);
        assert_eq!(e.sequence, Some(7));
        assert_eq!(e.last_ledger, Some(30));
        assert_eq!(e.fee(), Some(12));
    }

    #[test]
    fn test_entry_reads_string_sequence_fields() {
        let e = entry(1, json!({"Sequence": "7", "LastLedgerSequence": "30.0"}));
        assert!(e.pinned_sequence);
        assert_eq!(e.sequence, Some(7));
        assert_eq!(e.last_ledger, Some(30));

        let e = entry(2, json!({"Sequence": "seven", "LastLedgerSequence": "4294967296"}));
        assert!(!e.pinned_sequence);
        assert_eq!(e.last_ledger, None);
    }

    #[test]
    fn test_multisigned_entry_is_not_resubmittable() {
        let e = entry(1, json!({"Signers": []}));
        assert!(e.multisigned);
        assert!(!e.resubmittable);
    }

    #[test]
    fn test_record_id_keeps_newest_first() {
        let mut e = entry(1, json!({}));
        e.record_id([1; 32]);
        e.record_id([2; 32]);
        e.record_id([1; 32]);
        assert_eq!(e.submitted_ids, vec![[1; 32], [2; 32]]);
    }

    #[test]
    fn test_lookup_by_client_and_transaction_id() {
        let mut pending = set();
        let mut e = entry(1, json!({}));
        e.client_id = Some("order-7".into());
        e.record_id([9; 32]);
        pending.insert(e);
        assert_eq!(pending.find_by_client_id("order-7").map(|e| e.id), Some(1));
        assert_eq!(pending.find_by_transaction_id(&[9; 32]).map(|e| e.id), Some(1));
        assert!(pending.find_by_client_id("other").is_none());
    }

    #[test]
    fn test_caches_are_bounded() {
        let mut pending = set();
        for seq in 1..=3 {
            pending.mark_sequence_validated(seq);
        }
        assert!(!pending.is_sequence_validated(1));
        assert!(pending.is_sequence_validated(3));

        let tx = ValidatedTransaction {
            hash: [4; 32],
            account: AccountId::default(),
            sequence: 1,
            engine_result: "tesSUCCESS".into(),
            ledger_index: 10,
            ledger_hash: None,
        };
        pending.record_received(tx);
        assert!(pending.received_any(&[[0; 32], [4; 32]]).is_some());
    }

    #[test]
    fn test_min_initial_submit_index() {
        let mut pending = set();
        let mut a = entry(1, json!({}));
        a.initial_submit_index = Some(20);
        let mut b = entry(2, json!({}));
        b.initial_submit_index = Some(15);
        pending.insert(a);
        pending.insert(b);
        pending.insert(entry(3, json!({})));
        assert_eq!(pending.min_initial_submit_index(), Some(15));
    }
}
