//! The per-account submission state machine.
//!
//! `SubmissionManager` performs no I/O. Every input is a [`ManagerEvent`]
//! (or a `submit`/`abort` call) and every output is a list of [`Effect`]s
//! for a driver to carry out: fetch a sequence, send a payload, arm a
//! timer, query history, or publish a lifecycle signal.

use super::config::SubmissionConfig;
use super::entities::{
    EntryId, EntryState, RetryReason, Signal, SignalKind, SubmitReply, SubmitRequest, Summary,
    TransactionResult, ValidatedTransaction, TF_FULLY_CANONICAL_SIG,
};
use super::errors::SubmissionError;
use super::events::{Effect, ManagerEvent, SequencePurpose, SubmitPayload};
use super::fee::FeeSchedule;
use super::pending::{PendingEntry, PendingSet};
use crate::ports::{TransactionSigner, TransportError};
use lp_01_binary_codec::{encode_auto, signing_hash, transaction_id};
use serde_json::{Map, Value};
use shared_types::{is_overloaded, AccountId, Hash, LedgerIndex, ResultBucket};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Ledgers without confirmation before `missing` is signalled.
pub const MISSING_AFTER: u32 = 4;

/// Ledgers without confirmation before `lost` is signalled.
pub const LOST_AFTER: u32 = 8;

/// Drives every pending transaction of one account.
pub struct SubmissionManager {
    account: AccountId,
    config: SubmissionConfig,
    signer: Arc<dyn TransactionSigner>,
    secret: Option<String>,
    pending: PendingSet,
    next_sequence: Option<u32>,
    sequence_loading: bool,
    awaiting_sequence: VecDeque<EntryId>,
    fee_schedule: Option<FeeSchedule>,
    ledger_index: Option<LedgerIndex>,
    connected: bool,
    /// History replay after reconnect is in progress; the sweep is paused.
    reconciling: bool,
    next_entry_id: EntryId,
}

impl SubmissionManager {
    pub fn new(
        account: AccountId,
        config: SubmissionConfig,
        signer: Arc<dyn TransactionSigner>,
    ) -> Self {
        let pending = PendingSet::new(config.cache_size());
        Self {
            account,
            config,
            signer,
            secret: None,
            pending,
            next_sequence: None,
            sequence_loading: false,
            awaiting_sequence: VecDeque::new(),
            fee_schedule: None,
            ledger_index: None,
            connected: true,
            reconciling: false,
            next_entry_id: 1,
        }
    }

    /// Account secret used when a request carries none.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    pub fn pending(&self) -> &PendingSet {
        &self.pending
    }

    pub fn next_sequence(&self) -> Option<u32> {
        self.next_sequence
    }

    pub fn ledger_index(&self) -> Option<LedgerIndex> {
        self.ledger_index
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn summary(&self, id: EntryId) -> Option<Summary> {
        self.pending.get(id).map(PendingEntry::summary)
    }

    pub fn find_by_client_id(&self, client_id: &str) -> Option<Summary> {
        self.pending.find_by_client_id(client_id).map(PendingEntry::summary)
    }

    pub fn find_by_transaction_id(&self, hash: &Hash) -> Option<Summary> {
        self.pending.find_by_transaction_id(hash).map(PendingEntry::summary)
    }

    /// Start loading the account sequence ahead of the first submission.
    pub fn start(&mut self) -> Vec<Effect> {
        let mut out = Vec::new();
        if self.next_sequence.is_none() {
            self.request_initial_sequence(&mut out);
        }
        out
    }

    // =========================================================================
    // CALLER OPERATIONS
    // =========================================================================

    /// Queue a transaction and dispatch it as soon as its sequence is known.
    pub fn submit(&mut self, request: SubmitRequest) -> (EntryId, Vec<Effect>) {
        let id = self.next_entry_id;
        self.next_entry_id += 1;

        let mut tx_json = request.tx_json;
        tx_json
            .entry("Account")
            .or_insert_with(|| Value::String(self.account.to_address()));

        let mut entry = PendingEntry::new(id, tx_json);
        entry.client_id = request.client_id;
        entry.secret = request.secret.or_else(|| self.secret.clone());
        entry.resubmittable &= self.config.automatic_resubmission;
        let needs_sequence = entry.sequence.is_none();
        debug!(
            "[lp-03] entry {} queued (client id {:?})",
            id, entry.client_id
        );
        self.pending.insert(entry);

        let mut out = Vec::new();
        if needs_sequence && self.next_sequence.is_none() {
            self.awaiting_sequence.push_back(id);
            self.request_initial_sequence(&mut out);
        } else {
            self.dispatch(id, &mut out);
        }
        (id, out)
    }

    /// Give up on an entry.
    ///
    /// An entry that was never dispatched fails at once. Once any attempt
    /// has gone out the entry only stops retrying and stays until it
    /// validates or expires.
    pub fn abort(&mut self, id: EntryId) -> Vec<Effect> {
        let mut out = Vec::new();
        let Some(entry) = self.pending.get_mut(id) else {
            return out;
        };
        if entry.attempts == 0 {
            self.awaiting_sequence.retain(|queued| *queued != id);
            self.fail(id, SubmissionError::Aborted, true, &mut out);
        } else {
            debug!("[lp-03] entry {} aborted in flight; retries suppressed", id);
            entry.aborted = true;
            entry.resubmittable = false;
        }
        out
    }

    /// Feed one event through the state machine.
    pub fn handle(&mut self, event: ManagerEvent) -> Vec<Effect> {
        let mut out = Vec::new();
        match event {
            ManagerEvent::SequenceLoaded { purpose, result } => {
                self.on_sequence_loaded(purpose, result, &mut out)
            }
            ManagerEvent::SubmitReplied {
                entry,
                attempt,
                reply,
            } => self.on_submit_reply(entry, attempt, reply, &mut out),
            ManagerEvent::TimeoutElapsed { entry, attempt } => {
                self.on_timeout(entry, attempt, &mut out)
            }
            ManagerEvent::LedgerClosed { ledger_index } => {
                self.on_ledger_closed(ledger_index, &mut out)
            }
            ManagerEvent::LoadChanged(schedule) => self.on_load_changed(schedule, &mut out),
            ManagerEvent::TransactionValidated(tx) => self.on_validated(tx, &mut out),
            ManagerEvent::Disconnected => {
                debug!("[lp-03] transport disconnected");
                self.connected = false;
            }
            ManagerEvent::Connected => self.on_connected(&mut out),
            ManagerEvent::HistoryLoaded(result) => self.on_history(result, &mut out),
        }
        out
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    fn request_initial_sequence(&mut self, out: &mut Vec<Effect>) {
        if !self.sequence_loading {
            self.sequence_loading = true;
            out.push(Effect::FetchSequence {
                purpose: SequencePurpose::Initial,
                delay: None,
            });
        }
    }

    /// Complete, sign and send the entry's next attempt.
    fn dispatch(&mut self, id: EntryId, out: &mut Vec<Effect>) {
        let Some(entry) = self.pending.get_mut(id) else {
            return;
        };
        if entry.finalized {
            return;
        }

        let release = entry.attempts == 0;
        if entry.attempts >= self.config.max_attempts {
            let attempts = entry.attempts;
            self.fail(id, SubmissionError::AttemptsExceeded { attempts }, false, out);
            return;
        }
        if let Some(fee) = entry.fee_over_max {
            let max = self.config.max_fee;
            self.fail(id, SubmissionError::MaxFeeExceeded { fee, max }, release, out);
            return;
        }
        if !self.config.local_signing && entry.attempts > 0 {
            self.fail(id, SubmissionError::LocalSigningRequired, false, out);
            return;
        }
        if !self.connected {
            debug!("[lp-03] entry {} waits for reconnect", id);
            if entry.attempts > 0 {
                entry.state = EntryState::Submitted;
            }
            return;
        }

        if entry.sequence.is_none() {
            let Some(sequence) = self.next_sequence else {
                self.awaiting_sequence.push_back(id);
                self.request_initial_sequence(out);
                return;
            };
            self.next_sequence = Some(sequence + 1);
            entry.sequence = Some(sequence);
            entry.tx_json.insert("Sequence".into(), sequence.into());
        }
        if entry.last_ledger.is_none() {
            if let Some(closed) = self.ledger_index {
                let last = closed + 1 + self.config.last_ledger_offset;
                entry.last_ledger = Some(last);
                entry.tx_json.insert("LastLedgerSequence".into(), last.into());
            }
        }

        let completed = complete(
            &self.config,
            self.signer.as_ref(),
            self.fee_schedule,
            entry,
        );
        let (payload, hash) = match completed {
            Ok(prepared) => prepared,
            Err(error) => {
                self.fail(id, error, release, out);
                return;
            }
        };

        let attempt = entry.attempts;
        entry.attempts += 1;
        entry.submit_index = self.ledger_index.map(|closed| closed + 1);
        if entry.initial_submit_index.is_none() {
            entry.initial_submit_index = entry.submit_index;
        }
        entry.awaiting_reply = Some(attempt);
        entry.state = EntryState::Submitted;
        entry.missing_signalled = false;
        entry.lost_signalled = false;

        debug!(
            "[lp-03] dispatching entry {} attempt {} (sequence {:?}, fee {:?})",
            id,
            attempt,
            entry.sequence,
            entry.fee()
        );
        let kind = if attempt == 0 {
            SignalKind::Submitted
        } else {
            SignalKind::Resubmitted
        };
        out.push(signal(entry, kind));
        out.push(Effect::Dispatch {
            entry: id,
            attempt,
            payload,
            hash,
        });
        out.push(Effect::ArmTimeout {
            entry: id,
            attempt,
            after: self.config.submission_timeout,
        });
    }

    /// Wait is over: send the entry again if policy allows.
    fn resubmit(&mut self, id: EntryId, reason: RetryReason, out: &mut Vec<Effect>) {
        let connected = self.connected;
        let Some(entry) = self.pending.get_mut(id) else {
            return;
        };
        if entry.finalized {
            return;
        }
        if entry.attempts == 0 {
            self.dispatch(id, out);
            return;
        }
        if !connected {
            entry.state = EntryState::Submitted;
            return;
        }
        let allowed = match reason {
            RetryReason::Overloaded => !entry.aborted,
            RetryReason::Result | RetryReason::NoReply => entry.resubmittable,
        };
        if !allowed {
            debug!("[lp-03] entry {} not resubmittable; awaiting validation or expiry", id);
            entry.state = EntryState::Submitted;
            return;
        }

        let ids = entry.submitted_ids.clone();
        if let Some(tx) = self.pending.received_any(&ids).cloned() {
            debug!("[lp-03] entry {} already seen validated", id);
            self.finalize_validated(id, &tx, out);
            return;
        }

        if let Some(mut sequence) = self.pending.get(id).and_then(|e| e.sequence) {
            let original = sequence;
            while self.pending.is_sequence_validated(sequence) {
                sequence += 1;
            }
            if sequence != original {
                debug!(
                    "[lp-03] entry {} sequence {} taken; moving to {}",
                    id, original, sequence
                );
                if self.next_sequence.is_some_and(|next| next <= sequence) {
                    self.next_sequence = Some(sequence + 1);
                }
                if let Some(entry) = self.pending.get_mut(id) {
                    entry.sequence = Some(sequence);
                    entry.tx_json.insert("Sequence".into(), sequence.into());
                }
            }
        }

        self.dispatch(id, out);
    }

    // =========================================================================
    // TERMINAL TRANSITIONS
    // =========================================================================

    fn fail(
        &mut self,
        id: EntryId,
        error: SubmissionError,
        release_sequence: bool,
        out: &mut Vec<Effect>,
    ) {
        let Some(mut entry) = self.pending.remove(id) else {
            return;
        };
        if release_sequence {
            self.release_sequence(&entry);
        }
        self.awaiting_sequence.retain(|queued| *queued != id);

        entry.state = EntryState::Failed;
        entry.finalized = true;
        entry.awaiting_reply = None;
        if !matches!(error, SubmissionError::Network { .. }) || entry.result.is_none() {
            entry.result = Some(TransactionResult {
                engine_result: error.code().to_string(),
                engine_result_message: Some(error.to_string()),
                ..TransactionResult::default()
            });
        }
        warn!("[lp-03] entry {} failed: {} ({})", id, error.code(), error);

        out.push(signal(&entry, SignalKind::Error(error)));
        out.push(signal(&entry, SignalKind::Final(Box::new(entry.summary()))));
    }

    fn finalize_validated(&mut self, id: EntryId, tx: &ValidatedTransaction, out: &mut Vec<Effect>) {
        let Some(mut entry) = self.pending.remove(id) else {
            return;
        };
        self.awaiting_sequence.retain(|queued| *queued != id);
        entry.result = Some(TransactionResult::from(tx));
        entry.finalized = true;
        entry.awaiting_reply = None;

        let kind = if ResultBucket::classify(&tx.engine_result) == ResultBucket::Success {
            entry.state = EntryState::Validated;
            info!(
                "[lp-03] entry {} validated in ledger {}",
                id, tx.ledger_index
            );
            SignalKind::Success
        } else {
            entry.state = EntryState::Failed;
            info!(
                "[lp-03] entry {} validated with {} in ledger {}",
                id, tx.engine_result, tx.ledger_index
            );
            SignalKind::Error(SubmissionError::Network {
                code: tx.engine_result.clone(),
                message: None,
            })
        };
        out.push(signal(&entry, kind));
        out.push(signal(&entry, SignalKind::Final(Box::new(entry.summary()))));
    }

    /// Hand back an allocated sequence if nothing was allocated after it.
    fn release_sequence(&mut self, entry: &PendingEntry) {
        if entry.pinned_sequence {
            return;
        }
        if let (Some(sequence), Some(next)) = (entry.sequence, self.next_sequence) {
            if next == sequence + 1 {
                debug!("[lp-03] releasing sequence {}", sequence);
                self.next_sequence = Some(sequence);
            }
        }
    }

    // =========================================================================
    // EVENT HANDLERS
    // =========================================================================

    fn on_submit_reply(
        &mut self,
        id: EntryId,
        attempt: u32,
        reply: Result<SubmitReply, TransportError>,
        out: &mut Vec<Effect>,
    ) {
        let connected = self.connected;
        let resubmission = self.config.automatic_resubmission;
        let Some(entry) = self.pending.get_mut(id) else {
            debug!("[lp-03] reply for unknown entry {} dropped", id);
            return;
        };
        if entry.awaiting_reply != Some(attempt) {
            debug!(
                "[lp-03] stale reply for entry {} attempt {} dropped",
                id, attempt
            );
            return;
        }
        entry.awaiting_reply = None;

        let reply = match reply {
            Ok(reply) => reply,
            Err(error) => {
                warn!("[lp-03] submit of entry {} failed: {}", id, error);
                if connected {
                    entry.state = EntryState::RetryWait {
                        ledgers_remaining: 1,
                        reason: RetryReason::NoReply,
                    };
                }
                return;
            }
        };

        entry.result = Some(TransactionResult::from(&reply));
        if let Some(hash) = reply.tx_hash {
            entry.record_id(hash);
        }
        let code = reply.engine_result;
        debug!("[lp-03] entry {} attempt {} -> {}", id, attempt, code);

        let retry = |reason| EntryState::RetryWait {
            ledgers_remaining: 1,
            reason,
        };
        match ResultBucket::classify(&code) {
            ResultBucket::Success => {
                entry.state = EntryState::Proposed;
                out.push(signal(entry, SignalKind::Proposed));
            }
            ResultBucket::ClaimedFee => entry.state = EntryState::Submitted,
            ResultBucket::Retry => {
                entry.state = retry(RetryReason::Result);
                if entry.resubmittable && resubmission {
                    out.push(Effect::FetchSequence {
                        purpose: SequencePurpose::Fill { entry: id },
                        delay: None,
                    });
                }
            }
            ResultBucket::SequenceFailure | ResultBucket::LocalMalformed => {
                entry.state = retry(RetryReason::Result);
            }
            ResultBucket::Malformed | ResultBucket::ServerError => {
                if is_overloaded(&code) {
                    entry.state = retry(RetryReason::Overloaded);
                } else {
                    let message = reply.engine_result_message;
                    self.fail(id, SubmissionError::Network { code, message }, true, out);
                }
            }
        }
    }

    fn on_timeout(&mut self, id: EntryId, attempt: u32, out: &mut Vec<Effect>) {
        let connected = self.connected;
        let Some(entry) = self.pending.get_mut(id) else {
            return;
        };
        if entry.awaiting_reply != Some(attempt) {
            return;
        }
        debug!("[lp-03] entry {} attempt {} timed out", id, attempt);
        entry.awaiting_reply = None;
        out.push(signal(entry, SignalKind::Timeout));
        if connected {
            entry.state = EntryState::RetryWait {
                ledgers_remaining: 1,
                reason: RetryReason::NoReply,
            };
        }
    }

    fn on_ledger_closed(&mut self, ledger_index: LedgerIndex, out: &mut Vec<Effect>) {
        if self.ledger_index.is_some_and(|current| ledger_index <= current) {
            debug!("[lp-03] ledger {} out of order; ignored", ledger_index);
            return;
        }
        self.ledger_index = Some(ledger_index);
        if self.reconciling {
            return;
        }

        let mut expired = Vec::new();
        let mut due = Vec::new();
        for entry in self.pending.iter_mut() {
            if entry.finalized {
                continue;
            }
            if let Some(last_ledger) = entry.last_ledger {
                if ledger_index > last_ledger {
                    expired.push((entry.id, last_ledger));
                    continue;
                }
            }
            if let Some(submit_index) = entry.submit_index {
                let age = ledger_index.saturating_sub(submit_index);
                if age >= MISSING_AFTER && !entry.missing_signalled {
                    entry.missing_signalled = true;
                    out.push(signal(entry, SignalKind::Missing));
                }
                if age >= LOST_AFTER && !entry.lost_signalled {
                    entry.lost_signalled = true;
                    out.push(signal(entry, SignalKind::Lost));
                }
            }
            if let EntryState::RetryWait {
                ledgers_remaining,
                reason,
            } = entry.state
            {
                if ledgers_remaining <= 1 {
                    due.push((entry.id, reason));
                } else {
                    entry.state = EntryState::RetryWait {
                        ledgers_remaining: ledgers_remaining - 1,
                        reason,
                    };
                }
            }
        }

        for (id, last_ledger) in expired {
            let error = SubmissionError::LedgerExpired {
                last_ledger,
                ledger_index,
            };
            self.fail(id, error, false, out);
        }
        for (id, reason) in due {
            self.resubmit(id, reason, out);
        }
    }

    fn on_load_changed(&mut self, schedule: FeeSchedule, out: &mut Vec<Effect>) {
        self.fee_schedule = Some(schedule);
        if !self.config.local_fee {
            return;
        }
        let Some(fee) = schedule.fee_for(self.config.fee_units, self.config.fee_cushion) else {
            return;
        };
        let max_fee = self.config.max_fee;

        for entry in self.pending.iter_mut() {
            if entry.fixed_fee || entry.finalized {
                continue;
            }
            if fee > max_fee {
                debug!(
                    "[lp-03] entry {} fee {} above maximum {}; fails on next attempt",
                    entry.id, fee, max_fee
                );
                entry.fee_over_max = Some(fee);
                continue;
            }
            entry.fee_over_max = None;
            let old = entry.fee();
            if old == Some(fee) {
                continue;
            }
            entry.tx_json.insert("Fee".into(), Value::String(fee.to_string()));
            if let Some(old) = old {
                debug!("[lp-03] entry {} fee {} -> {}", entry.id, old, fee);
                out.push(signal(entry, SignalKind::FeeAdjusted { old, new: fee }));
            }
        }
    }

    fn on_validated(&mut self, tx: ValidatedTransaction, out: &mut Vec<Effect>) {
        if tx.account == self.account {
            self.pending.mark_sequence_validated(tx.sequence);
            if self.next_sequence.is_some_and(|next| next <= tx.sequence) {
                self.next_sequence = Some(tx.sequence + 1);
            }
        }
        self.pending.record_received(tx.clone());
        if let Some(id) = self.pending.find_by_transaction_id(&tx.hash).map(|e| e.id) {
            self.finalize_validated(id, &tx, out);
        }
    }

    fn on_connected(&mut self, out: &mut Vec<Effect>) {
        debug!("[lp-03] transport connected");
        self.connected = true;
        if self.next_sequence.is_none() && !self.awaiting_sequence.is_empty() {
            self.request_initial_sequence(out);
        }
        if self.pending.is_empty() {
            return;
        }

        self.reconciling = true;
        match self.pending.min_initial_submit_index() {
            // An entry cannot land before the ledger it was first submitted for.
            Some(first) => out.push(Effect::FetchHistory { min_ledger: first }),
            None => out.push(Effect::FetchSequence {
                purpose: SequencePurpose::Reload,
                delay: None,
            }),
        }
    }

    fn on_history(
        &mut self,
        result: Result<Vec<ValidatedTransaction>, TransportError>,
        out: &mut Vec<Effect>,
    ) {
        if !self.reconciling {
            debug!("[lp-03] unexpected history reply dropped");
            return;
        }
        match result {
            Ok(transactions) => {
                debug!("[lp-03] replaying {} historical transactions", transactions.len());
                for tx in transactions {
                    self.on_validated(tx, out);
                }
                out.push(Effect::FetchSequence {
                    purpose: SequencePurpose::Reload,
                    delay: None,
                });
            }
            Err(error) => {
                warn!("[lp-03] history query failed: {}; resuming without resubmit", error);
                self.reconciling = false;
            }
        }
    }

    fn on_sequence_loaded(
        &mut self,
        purpose: SequencePurpose,
        result: Result<u32, TransportError>,
        out: &mut Vec<Effect>,
    ) {
        match (purpose, result) {
            (SequencePurpose::Initial, Ok(sequence)) => {
                self.sequence_loading = false;
                let next = self.next_sequence.map_or(sequence, |n| n.max(sequence));
                debug!("[lp-03] account sequence loaded: {}", next);
                self.next_sequence = Some(next);
                let queued: Vec<_> = self.awaiting_sequence.drain(..).collect();
                for id in queued {
                    self.dispatch(id, out);
                }
            }
            (SequencePurpose::Reload, Ok(sequence)) => {
                let highest = self
                    .pending
                    .iter()
                    .filter(|e| !e.pinned_sequence)
                    .filter_map(|e| e.sequence)
                    .max();
                let next = highest.map_or(sequence, |h| sequence.max(h + 1));
                debug!("[lp-03] sequence reloaded: {}; resubmitting pending", next);
                self.next_sequence = Some(next);
                self.sequence_loading = false;
                self.reconciling = false;

                let queued: Vec<_> = self.awaiting_sequence.drain(..).collect();
                for id in self.pending.ids() {
                    if queued.contains(&id) {
                        continue;
                    }
                    if let Some(entry) = self.pending.get_mut(id) {
                        entry.awaiting_reply = None;
                    }
                    self.resubmit(id, RetryReason::NoReply, out);
                }
                for id in queued {
                    self.dispatch(id, out);
                }
            }
            (SequencePurpose::Fill { entry }, Ok(sequence)) => self.fill_gap(entry, sequence, out),
            (purpose @ (SequencePurpose::Initial | SequencePurpose::Reload), Err(error)) => {
                warn!(
                    "[lp-03] sequence fetch failed: {}; retrying in {:?}",
                    error, self.config.sequence_retry_delay
                );
                out.push(Effect::FetchSequence {
                    purpose,
                    delay: Some(self.config.sequence_retry_delay),
                });
            }
            (SequencePurpose::Fill { entry }, Err(error)) => {
                debug!("[lp-03] gap check for entry {} failed: {}", entry, error);
            }
        }
    }

    /// Fill `[network_sequence, entry sequence)` with no-op transactions.
    fn fill_gap(&mut self, id: EntryId, network_sequence: u32, out: &mut Vec<Effect>) {
        let Some(entry) = self.pending.get(id) else {
            return;
        };
        let Some(target) = entry.sequence else {
            return;
        };
        let secret = entry.secret.clone();

        for sequence in network_sequence..target {
            if self.pending.sequence_in_use(sequence, id) {
                continue;
            }
            let filler_id = self.next_entry_id;
            self.next_entry_id += 1;

            let mut tx_json = Map::new();
            tx_json.insert("TransactionType".into(), "AccountSet".into());
            tx_json.insert("Account".into(), self.account.to_address().into());
            tx_json.insert("Sequence".into(), sequence.into());

            let mut filler = PendingEntry::new(filler_id, tx_json);
            filler.secret = secret.clone();
            filler.resubmittable &= self.config.automatic_resubmission;
            debug!(
                "[lp-03] filling sequence {} ahead of entry {} with entry {}",
                sequence, id, filler_id
            );
            self.pending.insert(filler);
            self.dispatch(filler_id, out);
        }
    }
}

fn signal(entry: &PendingEntry, kind: SignalKind) -> Effect {
    Effect::Signal(Signal {
        entry: entry.id,
        client_id: entry.client_id.clone(),
        kind,
    })
}

/// Fill in everything the network needs and produce the payload.
///
/// Checks run in a fixed order so the first problem found is the one
/// reported.
fn complete(
    config: &SubmissionConfig,
    signer: &dyn TransactionSigner,
    schedule: Option<FeeSchedule>,
    entry: &mut PendingEntry,
) -> Result<(SubmitPayload, Option<Hash>), SubmissionError> {
    if !config.trusted && !config.local_signing {
        return Err(SubmissionError::UntrustedServer);
    }
    let secret = match (&entry.secret, entry.multisigned) {
        (Some(secret), _) => Some(secret.clone()),
        (None, true) => None,
        (None, false) => return Err(SubmissionError::UnknownSecret),
    };

    if entry.multisigned {
        entry.tx_json.insert("SigningPubKey".into(), "".into());
    } else if let (true, Some(secret)) = (config.local_signing, &secret) {
        let public_key = signer
            .public_key(secret)
            .map_err(|e| SubmissionError::InvalidSecret {
                reason: e.to_string(),
            })?;
        entry.tx_json.insert("SigningPubKey".into(), public_key.into());
    }

    if !entry.fixed_fee && config.local_fee {
        let fee = schedule
            .and_then(|s| s.fee_for(config.fee_units, config.fee_cushion))
            .ok_or(SubmissionError::Unconnected)?;
        entry.tx_json.insert("Fee".into(), fee.to_string().into());
    }
    if let Some(fee) = entry.fee() {
        if fee > config.max_fee {
            return Err(SubmissionError::MaxFeeExceeded {
                fee,
                max: config.max_fee,
            });
        }
    }

    if config.canonical_signing {
        let flags = entry
            .tx_json
            .get("Flags")
            .and_then(Value::as_u64)
            .and_then(|f| u32::try_from(f).ok())
            .unwrap_or(0);
        entry
            .tx_json
            .insert("Flags".into(), (flags | TF_FULLY_CANONICAL_SIG).into());
    }

    if !config.local_signing {
        let secret = secret.ok_or(SubmissionError::UnknownSecret)?;
        return Ok((
            SubmitPayload::Json {
                tx_json: entry.tx_json.clone(),
                secret,
            },
            None,
        ));
    }

    if let (false, Some(secret)) = (entry.multisigned, &secret) {
        let hash = signing_hash(&Value::Object(entry.tx_json.clone()))?;
        let signature = match &entry.signature {
            Some((signed, signature)) if *signed == hash => signature.clone(),
            _ => {
                let raw = signer
                    .sign(secret, &hash)
                    .map_err(|e| SubmissionError::InvalidSecret {
                        reason: e.to_string(),
                    })?;
                hex::encode_upper(raw)
            }
        };
        entry.signature = Some((hash, signature.clone()));
        entry.tx_json.insert("TxnSignature".into(), signature.into());
    }

    let blob = encode_auto(&Value::Object(entry.tx_json.clone()))?;
    let hash = transaction_id(blob.as_bytes());
    entry.record_id(hash);
    Ok((SubmitPayload::Blob(blob.to_hex()), Some(hash)))
}
