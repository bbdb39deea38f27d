//! ytree Engine
//!
//! Resolve structured paths against schema-bound data and mutate it.
//!
//! Responsibilities:
//! - Match path elements to record fields through primary and shadow
//!   schema paths
//! - Select list entries by typed key predicates, with wildcard and
//!   partial-key matching
//! - Materialize missing containers and entries, install scalar or
//!   structured payloads, erase with pruning
//! - Memoize resolutions in a shared path cache
//!
//! # Module Structure
//!
//! - `engine` - the `Engine` facade and its cached entry points
//! - `ops/` - read and write traversals
//! - `cache` - the path cache
//! - `options` - resolution flags
//! - `result` - payloads, locations and resolution results
//! - `error` - error types

mod cache;
mod engine;
mod error;
mod ops;
mod options;
mod result;

pub use cache::{CacheEntry, PathCache};
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use options::ResolveOptions;
pub use result::{DataRef, Location, Payload, Resolved, ResolvedNode, Step};
