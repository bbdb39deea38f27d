//! ytree Batch
//!
//! Applies grouped deletes, replaces and updates to one data tree.
//!
//! Responsibilities:
//! - Join every operation path onto the request prefix
//! - Run deletes, then replaces (delete + install), then updates
//! - Treat an atomic notification's prefix as deleted before its updates
//! - Stop at the first failure, or attempt everything and aggregate
//! - Optionally validate the whole tree afterwards
//!
//! # Module Structure
//!
//! - `request` - `SetRequest`, `Notification`, `Update`
//! - `options` - `ApplyOptions`, `FailureMode`
//! - `apply` - `Applier` and `ApplyReport`
//! - `error` - `BatchError`

mod apply;
mod error;
mod options;
mod request;

pub use apply::{Applier, ApplyReport};
pub use error::{BatchError, BatchResult, OpKind};
pub use options::{ApplyOptions, FailureMode};
pub use request::{Notification, SetRequest, Update};
