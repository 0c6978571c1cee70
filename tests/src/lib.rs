//! # Ledger Protocol Engine Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs       # codec → state tree → ledger header hash
//!     └── submission.rs  # submit → reply → validation through the async service
//!
//! tests/benches/
//! └── engine_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lp-tests
//! cargo test -p lp-tests integration::submission
//! cargo bench -p lp-tests
//! ```

pub mod integration;
