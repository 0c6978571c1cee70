//! What the manager reacts to, and what it asks its driver to do.

use super::entities::{EntryId, Signal, SubmitReply, ValidatedTransaction};
use super::fee::FeeSchedule;
use crate::ports::TransportError;
use serde_json::{Map, Value};
use shared_types::{Hash, LedgerIndex};
use std::time::Duration;

/// Why a sequence number is being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencePurpose {
    /// First load; queued submissions wait on it.
    Initial,
    /// Refresh after reconnect, before resubmitting.
    Reload,
    /// Find the gap in front of `entry` after a retryable result.
    Fill { entry: EntryId },
}

/// Bytes or JSON handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitPayload {
    /// Locally signed blob, uppercase hex.
    Blob(String),
    /// Unsigned transaction for a trusted server to sign.
    Json {
        tx_json: Map<String, Value>,
        secret: String,
    },
}

/// Inputs to [`SubmissionManager::handle`](super::SubmissionManager::handle).
#[derive(Debug, Clone)]
pub enum ManagerEvent {
    SequenceLoaded {
        purpose: SequencePurpose,
        result: Result<u32, TransportError>,
    },
    SubmitReplied {
        entry: EntryId,
        attempt: u32,
        reply: Result<SubmitReply, TransportError>,
    },
    TimeoutElapsed {
        entry: EntryId,
        attempt: u32,
    },
    LedgerClosed {
        ledger_index: LedgerIndex,
    },
    LoadChanged(FeeSchedule),
    TransactionValidated(ValidatedTransaction),
    Disconnected,
    Connected,
    HistoryLoaded(Result<Vec<ValidatedTransaction>, TransportError>),
}

/// Work for the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchSequence {
        purpose: SequencePurpose,
        delay: Option<Duration>,
    },
    Dispatch {
        entry: EntryId,
        attempt: u32,
        payload: SubmitPayload,
        hash: Option<Hash>,
    },
    ArmTimeout {
        entry: EntryId,
        attempt: u32,
        after: Duration,
    },
    FetchHistory {
        min_ledger: LedgerIndex,
    },
    Signal(Signal),
}
