//! # lp-02-state-tree
//!
//! Merkle State Tree and ledger hashing.
//!
//! ## Role in System
//!
//! - Depends on `lp-01-binary-codec` for leaf payloads and SHA-512 half
//! - Computes a ledger's transaction-tree and account-state-tree digests,
//!   and the ledger header hash built on them
//!
//! ## Tree Shape
//!
//! ```text
//!                    Inner (depth 0)  ── digest = H(MIN\0 ‖ c0 ‖ … ‖ c15)
//!                 /        |        \
//!           Leaf        Inner (1)     (empty → 32 zero bytes)
//!                      /      \
//!                  Leaf        Leaf
//! ```
//!
//! Keys are 256-bit; the nibble at depth `d` picks the child. A leaf sits at
//! the shallowest depth where its key prefix is unique, so the root digest
//! is a function of the key set alone.
//!
//! | Leaf kind | Digest |
//! |-----------|--------|
//! | `TransactionNoMeta` | the key itself |
//! | `TransactionWithMeta` | `H(SND\0 ‖ payload ‖ key)` |
//! | `AccountState` | `H(MLN\0 ‖ payload ‖ key)` |

pub mod domain;

pub use domain::*;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
