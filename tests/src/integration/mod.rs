//! Cross-crate flows.

pub mod flows;
pub mod submission;
