//! Domain layer: the field table, schemas, value types and the two
//! directions of the transcoder.

pub mod amount;
pub mod buffer;
pub mod digest;
pub mod errors;
pub mod fields;
pub mod parser;
pub mod paths;
pub mod schema;
pub mod serializer;

pub use amount::*;
pub use buffer::*;
pub use digest::*;
pub use errors::*;
pub use fields::*;
pub use parser::*;
pub use paths::*;
pub use schema::*;
pub use serializer::*;
