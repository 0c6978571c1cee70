//! # Ledger Protocol Engine Benchmarks
//!
//! | Crate | Operation | Target |
//! |-------|-----------|--------|
//! | lp-01 Binary Codec | encode / decode a payment | < 20µs |
//! | lp-01 Binary Codec | signing hash | < 20µs |
//! | lp-02 State Tree | build + digest, 10k leaves | < 100ms |
//! | lp-03 Submission Manager | sign a transaction | < 1ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lp_01_binary_codec::{decode, encode_auto, signing_hash};
use lp_02_state_tree::{LeafKind, StateTree};
use lp_03_submission_manager::{Secp256k1Signer, TransactionSigner};
use rand::Rng;
use serde_json::{json, Value};
use std::time::Duration;

const SECRET: &str = "1ACAAEDECE405B2A958212629E16F2EB46B153EEE94CDD350FDEFF52795525B7";

fn payment() -> Value {
    json!({
        "TransactionType": "Payment",
        "Account": "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
        "Destination": "rrrrrrrrrrrrrrrrrrrrrhoLvTp",
        "Amount": {
            "currency": "USD",
            "value": "1234.5678",
            "issuer": "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh"
        },
        "Fee": "12",
        "Flags": 2147483648u32,
        "Sequence": 42,
        "LastLedgerSequence": 1004,
        "SigningPubKey": "0330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020"
    })
}

// ============================================================================
// LP-01: Binary Codec
// ============================================================================

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("lp-01-binary-codec");
    let tx = payment();
    let blob = encode_auto(&tx).unwrap().into_bytes();

    group.bench_function("encode_payment", |b| {
        b.iter(|| black_box(encode_auto(black_box(&tx)).unwrap()))
    });
    group.bench_function("decode_payment", |b| {
        b.iter(|| black_box(decode(black_box(&blob)).unwrap()))
    });
    group.bench_function("signing_hash", |b| {
        b.iter(|| black_box(signing_hash(black_box(&tx)).unwrap()))
    });

    group.finish();
}

// ============================================================================
// LP-02: State Tree
// ============================================================================

fn bench_state_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("lp-02-state-tree");
    group.measurement_time(Duration::from_secs(10));

    let mut rng = rand::thread_rng();
    for size in [100usize, 1_000, 10_000] {
        let leaves: Vec<([u8; 32], Vec<u8>)> = (0..size)
            .map(|_| {
                let key: [u8; 32] = rng.gen();
                let payload: Vec<u8> = (0..64).map(|_| rng.gen()).collect();
                (key, payload)
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("build_and_digest", size), &leaves, |b, leaves| {
            b.iter(|| {
                let mut tree = StateTree::new();
                for (key, payload) in leaves {
                    tree.insert(*key, LeafKind::AccountState, payload.clone())
                        .unwrap();
                }
                black_box(tree.digest())
            })
        });
    }

    group.finish();
}

// ============================================================================
// LP-03: Submission Manager
// ============================================================================

fn bench_signing(c: &mut Criterion) {
    let mut group = c.benchmark_group("lp-03-submission-manager");
    let hash = signing_hash(&payment()).unwrap();

    group.bench_function("secp256k1_sign", |b| {
        b.iter(|| black_box(Secp256k1Signer.sign(SECRET, black_box(&hash)).unwrap()))
    });
    group.bench_function("secp256k1_public_key", |b| {
        b.iter(|| black_box(Secp256k1Signer.public_key(SECRET).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_codec, bench_state_tree, bench_signing);
criterion_main!(benches);
