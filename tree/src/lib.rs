//! ytree Bound Data
//!
//! In-memory data bound to a schema:
//! - Record descriptor tables (RecordType, FieldDescriptor)
//! - Bound nodes: containers, keyed and ordered lists, leaves, leaf-lists
//! - Data trees with a process-unique identity
//! - The Unmarshal seam and its default JSON decoder

mod decode;
mod error;
mod node;
mod record;

pub use decode::{json_to_value, DecodeOptions, JsonDecoder, Unmarshal};
pub use error::{DecodeError, DecodeResult, TreeError, TreeResult};
pub use node::{
    BoundNode, Container, DataTree, EntryMap, KeyedList, ListKey, OrderedList, TreeId,
};
pub use record::{parse_paths, FieldDescriptor, FieldShape, RecordBuilder, RecordType, SchemaPath};
