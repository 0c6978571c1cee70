pub mod errors;
pub mod ledger;
pub mod nibbles;
pub mod node;
pub mod tree;

pub use errors::*;
pub use ledger::*;
pub use nibbles::*;
pub use node::*;
pub use tree::*;
