//! Ports layer: the codec's driving API.

pub mod inbound;

pub use inbound::*;
