//! Engine facade.
//!
//! The `*_node` entry points resolve a path under any container bound to a
//! schema node and never touch the cache. The `DataTree` entry points
//! resolve from the tree root and keep the path cache coherent.

use crate::cache::{CacheEntry, PathCache};
use crate::error::EngineResult;
use crate::ops::{self, Ctx, Mode};
use crate::options::ResolveOptions;
use crate::result::{Payload, Resolved, ResolvedNode};
use std::sync::Arc;
use tracing::debug;
use ytree_core::{Path, Value};
use ytree_schema::{Schema, SchemaId};
use ytree_tree::{BoundNode, Container, DataTree, JsonDecoder, Unmarshal};
use ytree_validate::Validator;

/// Path resolver and mutator bound to one schema.
pub struct Engine {
    schema: Arc<Schema>,
    validator: Validator,
    cache: PathCache,
    decoder: Arc<dyn Unmarshal>,
}

impl Engine {
    /// Create an engine using the default JSON decoder.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            validator: Validator::new(),
            cache: PathCache::new(),
            decoder: Arc::new(JsonDecoder::new()),
        }
    }

    /// Replace the structured payload decoder.
    pub fn with_decoder(mut self, decoder: Arc<dyn Unmarshal>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn cache(&self) -> &PathCache {
        &self.cache
    }

    fn ctx<'e>(&'e self, opts: &'e ResolveOptions) -> Ctx<'e> {
        Ctx {
            schema: &self.schema,
            validator: &self.validator,
            decoder: self.decoder.as_ref(),
            opts,
        }
    }

    /// Read the nodes at `path` under `root`.
    pub fn get_node<'a>(
        &self,
        id: SchemaId,
        root: &'a Container,
        path: &Path,
        opts: &ResolveOptions,
    ) -> EngineResult<Vec<ResolvedNode<'a>>> {
        ops::read(&self.ctx(opts), id, root, path.elems())
    }

    /// Resolve `path`, creating missing containers and list entries.
    pub fn get_or_create_node(
        &self,
        id: SchemaId,
        root: &mut Container,
        path: &Path,
        opts: &ResolveOptions,
    ) -> EngineResult<Vec<Resolved>> {
        ops::write(&self.ctx(opts), id, root, path.elems(), Mode::Materialize)
    }

    /// Install `payload` at `path`, materializing as needed.
    pub fn set_node(
        &self,
        id: SchemaId,
        root: &mut Container,
        path: &Path,
        payload: &Payload,
        opts: &ResolveOptions,
    ) -> EngineResult<Vec<Resolved>> {
        ops::write(&self.ctx(opts), id, root, path.elems(), Mode::Install(payload))
    }

    /// Remove the nodes at `path` and prune emptied ancestors.
    pub fn delete_node(
        &self,
        id: SchemaId,
        root: &mut Container,
        path: &Path,
        opts: &ResolveOptions,
    ) -> EngineResult<Vec<Resolved>> {
        ops::write(&self.ctx(opts), id, root, path.elems(), Mode::Erase)
    }

    /// Read from the root of `tree`.
    pub fn get<'a>(
        &self,
        tree: &'a DataTree,
        path: &Path,
        opts: &ResolveOptions,
    ) -> EngineResult<Vec<ResolvedNode<'a>>> {
        self.get_node(self.schema.root(), tree.root(), path, opts)
    }

    /// Install from the root of `tree`, consulting the path cache first.
    pub fn set(
        &self,
        tree: &mut DataTree,
        path: &Path,
        payload: &Payload,
        opts: &ResolveOptions,
    ) -> EngineResult<Vec<Resolved>> {
        let key = path.canonical();
        let cacheable = is_cacheable(path, opts);
        if let (true, Payload::Scalar(value)) = (cacheable, payload) {
            if let Some(result) = self.set_cached(tree, &key, value, opts) {
                return result;
            }
            debug!(path = %key, "path cache miss");
        }

        let results = self.set_node(self.schema.root(), tree.root_mut(), path, payload, opts)?;
        if let (true, [single]) = (cacheable, results.as_slice()) {
            let leaf = self.schema.get(single.schema).map_or(false, |n| n.is_leaf());
            if leaf && single.present {
                self.cache.set(
                    key,
                    CacheEntry {
                        root: tree.id(),
                        parent: single.location.parent(),
                        nodes: results.clone(),
                    },
                );
            }
        }
        Ok(results)
    }

    /// Overwrite a cached leaf in place. `None` means fall back to a full
    /// resolution.
    fn set_cached(
        &self,
        tree: &mut DataTree,
        key: &str,
        value: &Value,
        opts: &ResolveOptions,
    ) -> Option<EngineResult<Vec<Resolved>>> {
        let entry = self.cache.get(key)?;
        if entry.root != tree.id() {
            return None;
        }
        let [resolved] = entry.nodes.as_slice() else {
            return None;
        };
        if resolved.pinned {
            return None;
        }
        let node = self.schema.get(resolved.schema).filter(|n| n.is_leaf())?;
        let (_, slot) = resolved.location.slot_mut(tree.root_mut())?;
        if !matches!(slot, Some(BoundNode::Leaf(_))) {
            return None;
        }
        debug!(path = key, "path cache hit");
        match ops::checked(&self.ctx(opts), node, value.clone(), key) {
            Ok(v) => {
                *slot = Some(BoundNode::Leaf(v));
                Some(Ok(vec![resolved.clone()]))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Delete from the root of `tree`, invalidating overlapping cache entries.
    ///
    /// Invalidation uses the canonical paths of the erased nodes, so
    /// wildcard, partial-key and module-qualified deletes drop every entry
    /// they cover. A failed delete may have erased part of the tree and
    /// clears the whole cache.
    pub fn delete(
        &self,
        tree: &mut DataTree,
        path: &Path,
        opts: &ResolveOptions,
    ) -> EngineResult<Vec<Resolved>> {
        self.cache.delete(&path.canonical());
        match self.delete_node(self.schema.root(), tree.root_mut(), path, opts) {
            Ok(results) => {
                for resolved in &results {
                    self.cache.delete(&resolved.path.canonical());
                }
                Ok(results)
            }
            Err(e) => {
                debug!(path = %path, error = %e, "delete failed, resetting path cache");
                self.cache.reset();
                Err(e)
            }
        }
    }

    /// Drop every cached resolution.
    pub fn reset_cache(&self) {
        self.cache.reset();
    }
}

/// Only paths that bind to exactly one node regardless of tree contents are
/// memoized. Shadow preferences change which field a path binds to, and
/// wildcard or partial-key paths select a varying set of entries.
fn is_cacheable(path: &Path, opts: &ResolveOptions) -> bool {
    !path.has_wildcards()
        && !opts.prefer_shadow
        && !opts.reverse_shadow
        && !opts.allow_partial_key_match
}
