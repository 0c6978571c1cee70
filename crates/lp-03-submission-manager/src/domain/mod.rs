//! Domain layer: configuration, entries, the pending set and the
//! submission state machine.

pub mod config;
pub mod entities;
pub mod errors;
pub mod events;
pub mod fee;
pub mod manager;
pub mod pending;

pub use config::*;
pub use entities::*;
pub use errors::*;
pub use events::*;
pub use fee::*;
pub use manager::*;
pub use pending::*;
