//! Ports for the submission manager.

pub mod outbound;

pub use outbound::*;
