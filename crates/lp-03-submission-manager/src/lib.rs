//! # lp-03-submission-manager
//!
//! Submission lifecycle for one account: sequence allocation, fee
//! computation, signing, dispatch, retry, expiry and reconnect
//! reconciliation.
//!
//! ## Entry States
//!
//! ```text
//!  unsubmitted ──dispatch──→ submitted ──tes──→ proposed ──validated──→ validated
//!                               │  ↑
//!                  ter/tef/tel  │  │ 1 ledger
//!                  timeout      ↓  │
//!                            retry-wait
//!                               │
//!       tem / max fee / attempts / LastLedgerSequence passed ──→ failed
//! ```
//!
//! | Result band | Action |
//! |-------------|--------|
//! | `tes` | proposed, wait for validation |
//! | `tec` | fee claimed, wait for validation |
//! | `ter` | fill the sequence gap, resubmit after 1 ledger |
//! | `tef`, `tel` | resubmit after 1 ledger |
//! | `tem` | fail, hand back the sequence |
//! | `tooBusy` | resubmit after 1 ledger even with resubmission off |
//!
//! ## Module Structure
//!
//! ```text
//! domain/    - config, entries, pending set, fee schedule, SubmissionManager (sans-IO)
//! ports/     - Transport (async), TransactionSigner
//! adapters/  - Secp256k1Signer
//! service    - SubmissionService, the tokio driver
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::Secp256k1Signer;
pub use domain::*;
pub use ports::*;
pub use service::{ServiceError, SubmissionHandle, SubmissionService};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
