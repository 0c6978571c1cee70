//! Adapters for the outbound ports.

pub mod signer;

pub use signer::Secp256k1Signer;
