//! # Ledger Hashing Flows
//!
//! Objects go through the codec, into the state tree, and up to the ledger
//! header hash:
//!
//! 1. **Codec round trip**: signed transaction → blob → value tree → same blob
//! 2. **Transaction tree**: transactions + metadata → transaction hash
//! 3. **Account state tree**: ledger entries → account hash
//! 4. **Header**: both digests → ledger hash, checked by `LedgerSnapshot`

#[cfg(test)]
mod tests {
    use lp_01_binary_codec::{decode_hex, encode_auto, signing_hash, transaction_id};
    use lp_02_state_tree::{
        account_state_hash, transaction_tree_hash, LedgerHeader, LedgerSnapshot, TreeError,
    };
    use lp_03_submission_manager::{Secp256k1Signer, TransactionSigner};
    use serde_json::{json, Value};
    use shared_types::ZERO_HASH;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const ALICE: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";
    const BOB: &str = "rrrrrrrrrrrrrrrrrrrrrhoLvTp";
    const SECRET: &str = "1ACAAEDECE405B2A958212629E16F2EB46B153EEE94CDD350FDEFF52795525B7";

    fn signed_payment(sequence: u32) -> Value {
        let signer = Secp256k1Signer;
        let mut tx = json!({
            "TransactionType": "Payment",
            "Account": ALICE,
            "Destination": BOB,
            "Amount": "1000000",
            "Fee": "12",
            "Flags": 2147483648u32,
            "Sequence": sequence,
            "SigningPubKey": signer.public_key(SECRET).unwrap(),
        });
        let hash = signing_hash(&tx).unwrap();
        let signature = signer.sign(SECRET, &hash).unwrap();
        tx["TxnSignature"] = json!(hex::encode_upper(signature));
        tx
    }

    fn with_metadata(mut tx: Value, index: u32) -> Value {
        tx["metaData"] = json!({
            "TransactionIndex": index,
            "TransactionResult": "tesSUCCESS",
            "AffectedNodes": [{
                "ModifiedNode": {
                    "LedgerEntryType": "AccountRoot",
                    "LedgerIndex": "13F1A95D7AAB7108D5CE7EEAF504B2894B8C674E6D68499076441C4837282BF8",
                    "FinalFields": { "Account": ALICE, "Balance": "99998988" }
                }
            }]
        });
        tx
    }

    fn account_root(index: &str, balance: &str, sequence: u32) -> Value {
        json!({
            "index": index,
            "LedgerEntryType": "AccountRoot",
            "Flags": 0,
            "Account": ALICE,
            "Sequence": sequence,
            "Balance": balance,
            "OwnerCount": 0,
            "PreviousTxnID": "DF530FB14C5304852F20080B0A8EEF3A6BDD044F41F4EBBD68B8B321145FE4FF",
            "PreviousTxnLgrSeq": 343570
        })
    }

    fn header(transaction_hash: [u8; 32], account_hash: [u8; 32]) -> LedgerHeader {
        LedgerHeader {
            ledger_index: 15202439,
            total_coins: 99_998_831_688_050_493,
            parent_hash: [0x12; 32],
            transaction_hash,
            account_hash,
            parent_close_time: 492_000_000,
            close_time: 492_000_010,
            close_time_resolution: 10,
            close_flags: 0,
        }
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[test]
    fn test_signed_transaction_round_trips_through_codec() {
        let tx = signed_payment(7);
        let blob = encode_auto(&tx).unwrap();
        let decoded = decode_hex(&blob.to_hex()).unwrap();
        assert_eq!(decoded["TxnSignature"], tx["TxnSignature"]);
        assert_eq!(encode_auto(&decoded).unwrap().as_bytes(), blob.as_bytes());

        // The signature is not part of what is signed.
        assert_eq!(signing_hash(&decoded).unwrap(), signing_hash(&tx).unwrap());
        assert_ne!(transaction_id(blob.as_bytes()), ZERO_HASH);
    }

    #[test]
    fn test_ledger_hash_from_contents() {
        let transactions = vec![
            with_metadata(signed_payment(7), 0),
            with_metadata(signed_payment(8), 1),
        ];
        let entries = vec![
            account_root(
                "13F1A95D7AAB7108D5CE7EEAF504B2894B8C674E6D68499076441C4837282BF8",
                "99998988",
                9,
            ),
            account_root(
                "2B6AC232AA4C4BE41BF49D2459FA4A0347E1B543A4C92FCEE0821C0201E2E9A8",
                "500000000",
                1,
            ),
        ];

        let tx_hash = transaction_tree_hash(&transactions).unwrap();
        let state_hash = account_state_hash(&entries).unwrap();
        assert_ne!(tx_hash, ZERO_HASH);
        assert_ne!(state_hash, ZERO_HASH);

        // Contents arrive in any order.
        let reversed: Vec<Value> = transactions.iter().rev().cloned().collect();
        assert_eq!(transaction_tree_hash(&reversed).unwrap(), tx_hash);

        let snapshot = LedgerSnapshot {
            header: header(tx_hash, state_hash),
            transactions: Some(transactions),
            account_state: Some(entries),
        };
        assert_eq!(snapshot.verified_hash().unwrap(), snapshot.header.hash());
    }

    #[test]
    fn test_tampered_entry_fails_verification() {
        let entries = vec![account_root(
            "13F1A95D7AAB7108D5CE7EEAF504B2894B8C674E6D68499076441C4837282BF8",
            "99998988",
            9,
        )];
        let state_hash = account_state_hash(&entries).unwrap();

        let tampered = vec![account_root(
            "13F1A95D7AAB7108D5CE7EEAF504B2894B8C674E6D68499076441C4837282BF8",
            "99998989",
            9,
        )];
        let snapshot = LedgerSnapshot {
            header: header(ZERO_HASH, state_hash),
            transactions: None,
            account_state: Some(tampered),
        };
        assert!(matches!(
            snapshot.verified_hash(),
            Err(TreeError::HashMismatch { .. })
        ));
    }

    #[test]
    fn test_snapshot_json_from_server_shape() {
        let json = json!({
            "ledger_index": "15202439",
            "total_coins": "99998831688050493",
            "parent_hash": "12".repeat(32),
            "transaction_hash": hex::encode_upper(ZERO_HASH),
            "account_hash": hex::encode_upper(ZERO_HASH),
            "parent_close_time": 492000000,
            "close_time": 492000010,
            "close_time_resolution": 10,
            "close_flags": 0,
            "transactions": []
        });
        let snapshot: LedgerSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snapshot.header, header(ZERO_HASH, ZERO_HASH));
        assert_eq!(snapshot.verified_hash().unwrap(), snapshot.header.hash());
    }
}
