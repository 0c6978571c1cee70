//! Entries, replies and the values the manager reports back.

use super::errors::SubmissionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared_types::{AccountId, Hash, LedgerIndex};

/// Identifies a pending entry within one manager.
pub type EntryId = u64;

/// Flag requesting a fully canonical signature.
pub const TF_FULLY_CANONICAL_SIG: u32 = 0x8000_0000;

/// What the caller hands to `submit`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub tx_json: Map<String, Value>,
    pub secret: Option<String>,
    pub client_id: Option<String>,
}

impl SubmitRequest {
    pub fn new(tx_json: Map<String, Value>) -> Self {
        Self {
            tx_json,
            secret: None,
            client_id: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }
}

/// The server's reply to a submit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReply {
    pub engine_result: String,
    #[serde(default)]
    pub engine_result_message: Option<String>,
    /// Id of the transaction as the server signed it (server-side signing).
    #[serde(default)]
    pub tx_hash: Option<Hash>,
}

impl SubmitReply {
    pub fn new(engine_result: impl Into<String>) -> Self {
        Self {
            engine_result: engine_result.into(),
            engine_result_message: None,
            tx_hash: None,
        }
    }
}

/// A transaction the network reports as included in a validated ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedTransaction {
    pub hash: Hash,
    pub account: AccountId,
    pub sequence: u32,
    pub engine_result: String,
    pub ledger_index: LedgerIndex,
    #[serde(default)]
    pub ledger_hash: Option<Hash>,
}

/// The last result recorded against an entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionResult {
    pub engine_result: String,
    pub engine_result_message: Option<String>,
    pub ledger_hash: Option<String>,
    pub ledger_index: Option<LedgerIndex>,
    pub transaction_hash: Option<String>,
}

impl From<&SubmitReply> for TransactionResult {
    fn from(reply: &SubmitReply) -> Self {
        Self {
            engine_result: reply.engine_result.clone(),
            engine_result_message: reply.engine_result_message.clone(),
            ..Self::default()
        }
    }
}

impl From<&ValidatedTransaction> for TransactionResult {
    fn from(tx: &ValidatedTransaction) -> Self {
        Self {
            engine_result: tx.engine_result.clone(),
            engine_result_message: None,
            ledger_hash: tx.ledger_hash.map(hex::encode_upper),
            ledger_index: Some(tx.ledger_index),
            transaction_hash: Some(hex::encode_upper(tx.hash)),
        }
    }
}

/// Why an entry is waiting out ledgers before its next dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// Retryable, sequence or local result from the server.
    Result,
    /// The server reported `tooBusy`; retried even without resubmission.
    Overloaded,
    /// No reply before the dispatch timeout, or the transport failed.
    NoReply,
}

/// Lifecycle position of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Unsubmitted,
    Submitted,
    Proposed,
    RetryWait {
        ledgers_remaining: u32,
        reason: RetryReason,
    },
    Validated,
    Failed,
}

impl EntryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsubmitted => "unsubmitted",
            Self::Submitted | Self::RetryWait { .. } => "submitted",
            Self::Proposed => "pending",
            Self::Validated => "validated",
            Self::Failed => "failed",
        }
    }
}

/// Snapshot of an entry for callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub tx_json: Value,
    pub client_id: Option<String>,
    /// Newest first.
    pub submitted_ids: Vec<String>,
    pub submission_attempts: u32,
    pub sequence: Option<u32>,
    pub fee: Option<String>,
    pub submit_index: Option<LedgerIndex>,
    pub initial_submit_index: Option<LedgerIndex>,
    pub last_ledger_sequence: Option<LedgerIndex>,
    pub state: &'static str,
    pub finalized: bool,
    pub result: Option<TransactionResult>,
}

/// Lifecycle notification for one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalKind {
    Submitted,
    Proposed,
    Resubmitted,
    Missing,
    Lost,
    FeeAdjusted { old: u64, new: u64 },
    Timeout,
    Success,
    Error(SubmissionError),
    Final(Box<Summary>),
}

impl SignalKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Proposed => "proposed",
            Self::Resubmitted => "resubmitted",
            Self::Missing => "missing",
            Self::Lost => "lost",
            Self::FeeAdjusted { .. } => "fee_adjusted",
            Self::Timeout => "timeout",
            Self::Success => "success",
            Self::Error(_) => "error",
            Self::Final(_) => "final",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub entry: EntryId,
    pub client_id: Option<String>,
    pub kind: SignalKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_wait_reads_as_submitted() {
        let state = EntryState::RetryWait {
            ledgers_remaining: 1,
            reason: RetryReason::Result,
        };
        assert_eq!(state.as_str(), "submitted");
        assert_eq!(EntryState::Proposed.as_str(), "pending");
    }

    #[test]
    fn test_result_from_validated() {
        let tx = ValidatedTransaction {
            hash: [0xAB; 32],
            account: AccountId::default(),
            sequence: 4,
            engine_result: "tesSUCCESS".into(),
            ledger_index: 100,
            ledger_hash: None,
        };
        let result = TransactionResult::from(&tx);
        assert_eq!(result.ledger_index, Some(100));
        assert_eq!(result.transaction_hash.unwrap(), "AB".repeat(32));
    }
}
