//! Batch request shapes.

use ytree_core::Path;
use ytree_engine::Payload;

/// A value to install at a path.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub path: Path,
    pub value: Payload,
}

impl Update {
    pub fn new(path: Path, value: impl Into<Payload>) -> Self {
        Self {
            path,
            value: value.into(),
        }
    }
}

/// Deletes, replaces and updates sharing one prefix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetRequest {
    pub prefix: Path,
    pub deletes: Vec<Path>,
    pub replaces: Vec<Update>,
    pub updates: Vec<Update>,
}

impl SetRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: Path) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn delete(mut self, path: Path) -> Self {
        self.deletes.push(path);
        self
    }

    pub fn replace(mut self, path: Path, value: impl Into<Payload>) -> Self {
        self.replaces.push(Update::new(path, value));
        self
    }

    pub fn update(mut self, path: Path, value: impl Into<Payload>) -> Self {
        self.updates.push(Update::new(path, value));
        self
    }

    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.deletes.len() + self.replaces.len() + self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Deletes and updates under one prefix, optionally replacing the whole
/// prefix subtree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notification {
    pub prefix: Path,
    pub deletes: Vec<Path>,
    pub updates: Vec<Update>,
    /// Delete everything under `prefix` before applying the updates.
    pub atomic: bool,
}

impl Notification {
    pub fn new(prefix: Path) -> Self {
        Self {
            prefix,
            ..Self::default()
        }
    }

    pub fn atomic(mut self) -> Self {
        self.atomic = true;
        self
    }

    pub fn delete(mut self, path: Path) -> Self {
        self.deletes.push(path);
        self
    }

    pub fn update(mut self, path: Path, value: impl Into<Payload>) -> Self {
        self.updates.push(Update::new(path, value));
        self
    }
}
