//! Path resolution cache.
//!
//! Maps the canonical string of a path to the last resolution of that path.
//! One reader/writer lock guards the whole map. Writes are last-writer-wins.

use crate::result::{Location, Resolved};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use ytree_tree::TreeId;

/// A memoized resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Tree the resolution was made against.
    pub root: TreeId,
    /// Location of the resolved node's parent.
    pub parent: Location,
    /// Resolved nodes.
    pub nodes: Vec<Resolved>,
}

/// Shared cache of path resolutions.
#[derive(Debug, Default)]
pub struct PathCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a canonical path.
    pub fn get(&self, path: &str) -> Option<CacheEntry> {
        self.entries.read().get(path).cloned()
    }

    /// Record a resolution, replacing any previous one.
    pub fn set(&self, path: impl Into<String>, entry: CacheEntry) {
        self.entries.write().insert(path.into(), entry);
    }

    /// Drop every entry whose key contains `path`. Returns how many went.
    pub fn delete(&self, path: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| !key.contains(path));
        let removed = before - entries.len();
        debug!(path, removed, "invalidated cache entries");
        removed
    }

    /// Drop everything.
    pub fn reset(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ytree_tree::{DataTree, RecordType};

    fn entry(tree: &DataTree) -> CacheEntry {
        CacheEntry {
            root: tree.id(),
            parent: Location::root(),
            nodes: Vec::new(),
        }
    }

    // ========== TEST: delete_invalidates_by_substring ==========
    #[test]
    fn test_delete_invalidates_by_substring() {
        // GIVEN entries under two subtrees
        let tree = DataTree::new(RecordType::builder("Root").build());
        let cache = PathCache::new();
        cache.set("/a/b/c", entry(&tree));
        cache.set("/a/b/d", entry(&tree));
        cache.set("/x/y", entry(&tree));

        // WHEN a prefix is deleted
        let removed = cache.delete("/a/b");

        // THEN every key containing it is gone
        assert_eq!(removed, 2);
        assert!(cache.get("/a/b/c").is_none());
        assert!(cache.get("/x/y").is_some());
    }

    #[test]
    fn test_root_delete_clears_everything() {
        let tree = DataTree::new(RecordType::builder("Root").build());
        let cache = PathCache::new();
        cache.set("/a", entry(&tree));
        cache.set("/b[k=v]", entry(&tree));
        cache.delete("/");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_is_last_writer_wins() {
        let t1 = DataTree::new(RecordType::builder("Root").build());
        let t2 = DataTree::new(RecordType::builder("Root").build());
        let cache = PathCache::new();
        cache.set("/a", entry(&t1));
        cache.set("/a", entry(&t2));
        assert_eq!(cache.get("/a").map(|e| e.root), Some(t2.id()));
        cache.reset();
        assert_eq!(cache.len(), 0);
    }
}
