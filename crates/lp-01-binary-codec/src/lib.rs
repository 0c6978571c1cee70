//! # lp-01-binary-codec
//!
//! Canonical Object Codec for the ledger protocol engine.
//!
//! ## Role in System
//!
//! - **Leaf component**: depends on nothing but `shared-types`
//! - **Used by** the state tree (leaf payloads, node digests) and the
//!   submission manager (signing, blob serialization, transaction ids)
//!
//! ## Canonical Encoding
//!
//! ```text
//! JSON value tree ──encode──→ [schema check] ──→ fields sorted by (type, field) ──→ bytes
//!        ↑                                                                           │
//!        └────────────────────────────────decode─────────────────────────────────────┘
//! ```
//!
//! | Guarantee | Enforcement |
//! |-----------|-------------|
//! | Deterministic output | `domain/serializer.rs` - sort by `FieldDef::ordinal()` |
//! | Schema conformance | `domain/schema.rs` - `SchemaKind::validate()` |
//! | Bounded reads | `domain/buffer.rs` - every read checks remaining length |
//!
//! ## Digests
//!
//! SHA-512 half over an optional 4-byte domain prefix (`HashPrefix`).
//!
//! ## Module Structure
//!
//! ```text
//! domain/   - field table, schemas, amounts, paths, buffer, serializer, parser, digests
//! ports/    - CodecApi (inbound)
//! service   - BinaryCodec, the stateless CodecApi implementation
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::*;
pub use ports::*;
pub use service::BinaryCodec;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
