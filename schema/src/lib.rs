//! ytree Schema
//!
//! The read-only schema model the engine resolves paths against.
//!
//! - `types` - node kinds, leaf types and their restrictions
//! - `schema` - the immutable `Schema` arena and its lookups
//! - `builder` - `SchemaBuilder` for constructing a `Schema`
//! - `typed` - key parsing and scalar coercion into a leaf's kind

mod builder;
mod schema;
mod typed;
mod types;

pub use builder::{NodeBuilder, SchemaBuilder, SchemaError};
pub use schema::{Schema, SchemaNode};
pub use types::*;
