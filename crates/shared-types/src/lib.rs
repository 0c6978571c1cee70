//! # Shared Types Crate
//!
//! Types every ledger-protocol crate agrees on.
//!
//! ## Contents
//!
//! - **Entities**: `Hash`, `AccountId` (base-58 check addresses), `LedgerIndex`
//! - **Result codes**: the fixed network result-code table and its
//!   classification into submission buckets
//! - **Errors**: address parsing failures
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the result-code table lives here so the codec
//!   (which encodes `TransactionResult`) and the submission manager (which
//!   classifies replies) can never disagree.
//! - **Raw bytes internally**: accounts are always stored as their 20-byte
//!   identifier; the base-58 form exists only at the edges.

pub mod entities;
pub mod errors;
pub mod result_code;

pub use entities::*;
pub use errors::*;
pub use result_code::*;
