//! # Submission Flows
//!
//! Drives a [`SubmissionService`] against an in-memory ledger that decodes
//! every blob it receives, so the whole path is exercised: fee and sequence
//! assignment, local signing, binary encoding, server reply classification
//! and validation.
//!
//! [`SubmissionService`]: lp_03_submission_manager::SubmissionService

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use lp_01_binary_codec::{decode_hex, transaction_id, CanonicalBuffer};
    use lp_03_submission_manager::{
        FeeSchedule, Secp256k1Signer, Signal, SignalKind, SubmissionConfig, SubmissionHandle,
        SubmissionManager, SubmissionService, SubmitPayload, SubmitReply, SubmitRequest,
        Transport, TransportError, ValidatedTransaction,
    };
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use shared_types::{AccountId, LedgerIndex};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    const ALICE: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";
    const SECRET: &str = "1ACAAEDECE405B2A958212629E16F2EB46B153EEE94CDD350FDEFF52795525B7";

    // =============================================================================
    // IN-MEMORY LEDGER
    // =============================================================================

    /// Accepts every blob with `tesSUCCESS` and remembers it until a test
    /// validates it.
    struct MemoryLedger {
        account: AccountId,
        sequence: u32,
        submitted: Mutex<Vec<Vec<u8>>>,
        history: Mutex<Vec<ValidatedTransaction>>,
    }

    impl MemoryLedger {
        fn new(sequence: u32) -> Self {
            Self {
                account: AccountId::from_address(ALICE).unwrap(),
                sequence,
                submitted: Mutex::new(Vec::new()),
                history: Mutex::new(Vec::new()),
            }
        }

        fn last_submitted(&self) -> Value {
            let blob = self.submitted.lock().last().cloned().expect("a submitted blob");
            decode_hex(&hex::encode(blob)).unwrap()
        }

        /// Validate the most recent blob in `ledger_index`.
        fn validate_last(&self, ledger_index: LedgerIndex) -> ValidatedTransaction {
            let blob = self.submitted.lock().last().cloned().expect("a submitted blob");
            let tx = decode_hex(&hex::encode(&blob)).unwrap();
            let validated = ValidatedTransaction {
                hash: transaction_id(&blob),
                account: self.account,
                sequence: tx["Sequence"].as_u64().unwrap() as u32,
                engine_result: "tesSUCCESS".to_string(),
                ledger_index,
                ledger_hash: Some([0xAB; 32]),
            };
            self.history.lock().push(validated.clone());
            validated
        }
    }

    #[async_trait]
    impl Transport for MemoryLedger {
        async fn next_sequence(&self, _account: &AccountId) -> Result<u32, TransportError> {
            Ok(self.sequence)
        }

        async fn submit(&self, payload: SubmitPayload) -> Result<SubmitReply, TransportError> {
            let SubmitPayload::Blob(blob) = payload else {
                return Ok(SubmitReply::new("temMALFORMED"));
            };
            let buffer = CanonicalBuffer::from_hex(&blob).map_err(|e| TransportError::Remote {
                code: "invalidParams".to_string(),
                message: e.to_string(),
            })?;
            self.submitted.lock().push(buffer.into_bytes());
            Ok(SubmitReply::new("tesSUCCESS"))
        }

        async fn account_tx(
            &self,
            _account: &AccountId,
            min_ledger: LedgerIndex,
        ) -> Result<Vec<ValidatedTransaction>, TransportError> {
            Ok(self
                .history
                .lock()
                .iter()
                .filter(|tx| tx.ledger_index >= min_ledger)
                .cloned()
                .collect())
        }
    }

    // =============================================================================
    // HELPERS
    // =============================================================================

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("lp_03_submission_manager=debug")
            .with_test_writer()
            .try_init();
    }

    async fn start(
        ledger: Arc<MemoryLedger>,
        ledger_index: LedgerIndex,
    ) -> (SubmissionHandle, UnboundedReceiver<Signal>) {
        init_tracing();
        let manager = SubmissionManager::new(
            AccountId::from_address(ALICE).unwrap(),
            SubmissionConfig::for_testing(),
            Arc::new(Secp256k1Signer),
        )
        .with_secret(SECRET);
        let (handle, signals, _task) = SubmissionService::spawn(manager, ledger);
        handle.load_changed(FeeSchedule::UNLOADED).await.unwrap();
        handle.ledger_closed(ledger_index).await.unwrap();
        (handle, signals)
    }

    fn payment(client_id: &str) -> SubmitRequest {
        let tx = json!({
            "TransactionType": "Payment",
            "Destination": "rrrrrrrrrrrrrrrrrrrrrhoLvTp",
            "Amount": "1000000"
        });
        SubmitRequest::new(tx.as_object().cloned().unwrap()).with_client_id(client_id)
    }

    async fn next_signal(signals: &mut UnboundedReceiver<Signal>) -> Signal {
        tokio::time::timeout(Duration::from_secs(2), signals.recv())
            .await
            .expect("signal in time")
            .expect("service alive")
    }

    async fn expect_kinds(signals: &mut UnboundedReceiver<Signal>, kinds: &[&str]) -> Vec<Signal> {
        let mut seen = Vec::new();
        for kind in kinds {
            let signal = next_signal(signals).await;
            assert_eq!(signal.kind.name(), *kind, "unexpected signal {:?}", signal.kind);
            seen.push(signal);
        }
        seen
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_submit_sign_validate() {
        let ledger = Arc::new(MemoryLedger::new(42));
        let (handle, mut signals) = start(Arc::clone(&ledger), 1000).await;

        let entry = handle.submit(payment("order-1")).await.unwrap();
        let seen = expect_kinds(&mut signals, &["submitted", "proposed"]).await;
        assert_eq!(seen[0].client_id.as_deref(), Some("order-1"));

        let tx = ledger.last_submitted();
        assert_eq!(tx["Account"], ALICE);
        assert_eq!(tx["Sequence"], 42);
        assert_eq!(tx["Fee"], "12");
        assert_eq!(tx["LastLedgerSequence"], 1004);
        assert_eq!(tx["Flags"], 2147483648u32);
        assert!(tx["TxnSignature"].is_string());
        assert_eq!(tx["SigningPubKey"].as_str().map(str::len), Some(66));

        let validated = ledger.validate_last(1001);
        handle.transaction_validated(validated.clone()).await.unwrap();
        expect_kinds(&mut signals, &["success"]).await;

        let last = next_signal(&mut signals).await;
        let SignalKind::Final(summary) = last.kind else {
            panic!("expected final, got {:?}", last.kind);
        };
        assert!(summary.finalized);
        assert_eq!(summary.state, "validated");
        let result = summary.result.unwrap();
        assert_eq!(result.engine_result, "tesSUCCESS");
        assert_eq!(result.ledger_index, Some(1001));
        assert_eq!(result.transaction_hash, Some(hex::encode_upper(validated.hash)));

        assert_eq!(handle.summary(entry).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_consecutive_submissions_use_consecutive_sequences() {
        let ledger = Arc::new(MemoryLedger::new(7));
        let (handle, mut signals) = start(Arc::clone(&ledger), 500).await;

        let first = handle.submit(payment("a")).await.unwrap();
        let second = handle.submit(payment("b")).await.unwrap();

        let mut kinds = Vec::new();
        for _ in 0..4 {
            kinds.push(next_signal(&mut signals).await.kind.name());
        }
        assert_eq!(kinds.iter().filter(|k| **k == "proposed").count(), 2);

        let a = handle.summary(first).await.unwrap().unwrap();
        let b = handle.summary(second).await.unwrap().unwrap();
        assert_eq!(a.sequence, Some(7));
        assert_eq!(b.sequence, Some(8));
        assert_eq!(a.state, "pending");
        assert_eq!(ledger.submitted.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_fee_follows_server_load() {
        let ledger = Arc::new(MemoryLedger::new(1));
        let (handle, mut signals) = start(Arc::clone(&ledger), 10).await;
        handle
            .load_changed(FeeSchedule {
                load_factor: 512,
                ..FeeSchedule::UNLOADED
            })
            .await
            .unwrap();

        handle.submit(payment("loaded")).await.unwrap();
        expect_kinds(&mut signals, &["submitted", "proposed"]).await;
        assert_eq!(ledger.last_submitted()["Fee"], "24");
    }

    #[tokio::test]
    async fn test_reconnect_finds_transaction_in_history() {
        let ledger = Arc::new(MemoryLedger::new(3));
        let (handle, mut signals) = start(Arc::clone(&ledger), 200).await;

        let entry = handle.submit(payment("offline")).await.unwrap();
        expect_kinds(&mut signals, &["submitted", "proposed"]).await;

        // Validated while the client was away.
        handle.disconnected().await.unwrap();
        ledger.validate_last(201);
        handle.connected().await.unwrap();

        expect_kinds(&mut signals, &["success", "final"]).await;
        assert_eq!(handle.summary(entry).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_abort_in_flight_entry() {
        let ledger = Arc::new(MemoryLedger::new(9));
        let (handle, mut signals) = start(Arc::clone(&ledger), 300).await;

        let entry = handle.submit(payment("cancel")).await.unwrap();
        expect_kinds(&mut signals, &["submitted", "proposed"]).await;
        handle.abort(entry).await.unwrap();

        // Proposed entries keep waiting for the network; an aborted entry
        // is not resubmitted and expires with its last ledger.
        for index in 301..=305 {
            handle.ledger_closed(index).await.unwrap();
        }
        let mut kinds = Vec::new();
        loop {
            let signal = next_signal(&mut signals).await;
            let done = matches!(signal.kind, SignalKind::Final(_));
            kinds.push(signal.kind.name());
            if done {
                break;
            }
        }
        assert!(!kinds.contains(&"resubmitted"));
        assert_eq!(kinds.last(), Some(&"final"));
        assert_eq!(ledger.submitted.lock().len(), 1);
    }
}
