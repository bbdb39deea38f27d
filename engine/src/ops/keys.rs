//! Key predicates of list path elements.

use crate::error::{EngineError, EngineResult};
use crate::options::ResolveOptions;
use std::collections::BTreeMap;
use ytree_core::{Value, WILDCARD};
use ytree_schema::{Schema, SchemaNode};
use ytree_tree::{Container, ListKey, RecordType};

/// Typed key predicate: one slot per schema key, `None` matches anything.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct KeyFilter {
    dims: Vec<Option<Value>>,
}

impl KeyFilter {
    /// Parse a predicate against the list's declared keys.
    ///
    /// `*` is a wildcard only when wildcards are enabled; otherwise it is
    /// parsed as a literal key value.
    pub fn parse(
        schema: &Schema,
        list: &SchemaNode,
        keys: &BTreeMap<String, String>,
        opts: &ResolveOptions,
        at: &str,
    ) -> EngineResult<Self> {
        if let Some(unknown) = keys.keys().find(|k| !list.keys.contains(k)) {
            return Err(EngineError::schema_mismatch(
                at,
                format!("{unknown} is not a key of list {}", list.name),
            ));
        }
        let mut dims = Vec::with_capacity(list.keys.len());
        for name in &list.keys {
            let dim = match keys.get(name) {
                None if opts.allow_partial_key_match => None,
                None => {
                    return Err(EngineError::malformed(at, format!("missing key {name}")));
                }
                Some(raw) if raw == WILDCARD && opts.allow_wildcards => None,
                Some(raw) => {
                    let ty = schema
                        .key_leaf(list.id, name)
                        .and_then(|leaf| leaf.leaf_type.as_ref())
                        .ok_or_else(|| {
                            EngineError::schema_mismatch(at, format!("key {name} has no leaf type"))
                        })?;
                    let value = ty
                        .parse_key(raw)
                        .map_err(|e| EngineError::type_mismatch(at, e.to_string()))?;
                    Some(value)
                }
            };
            dims.push(dim);
        }
        Ok(Self { dims })
    }

    /// Compare only the dimensions the predicate fixes.
    pub fn matches(&self, key: &ListKey) -> bool {
        self.dims.len() == key.len()
            && self
                .dims
                .iter()
                .zip(key.values())
                .all(|(dim, v)| dim.as_ref().map_or(true, |d| d == v))
    }

    /// The complete key, if every dimension is fixed.
    pub fn full_key(&self) -> Option<ListKey> {
        self.dims
            .iter()
            .cloned()
            .collect::<Option<Vec<_>>>()
            .map(ListKey::new)
    }
}

/// Protects the key leaves of one list entry.
#[derive(Debug, Clone)]
pub(crate) struct EntryGuard<'s> {
    pub key_names: &'s [String],
    pub key: ListKey,
}

impl<'s> EntryGuard<'s> {
    /// The key value held by field `idx` of the entry, if it is a key leaf.
    pub fn pinned(&self, ty: &RecordType, idx: usize) -> Option<Value> {
        self.key_names
            .iter()
            .zip(self.key.values())
            .find(|(name, _)| ty.key_field_index(name) == Some(idx))
            .map(|(_, v)| v.clone())
    }

    /// Name of the first key leaf whose value no longer equals the entry key.
    pub fn changed(&self, entry: &Container) -> Option<&'s str> {
        let ty = entry.record_type();
        self.key_names
            .iter()
            .zip(self.key.values())
            .find(|(name, v)| {
                ty.key_field_index(name)
                    .and_then(|idx| entry.get(idx))
                    .and_then(|n| n.as_leaf())
                    .map_or(false, |held| held != *v)
            })
            .map(|(name, _)| name.as_str())
    }
}

/// Build a new entry with its key leaves set.
pub(crate) fn new_entry(
    ty: &std::sync::Arc<RecordType>,
    key_names: &[String],
    key: &ListKey,
    at: &str,
) -> EngineResult<Container> {
    let mut entry = Container::new(ty.clone());
    for (name, value) in key_names.iter().zip(key.values()) {
        let idx = ty.key_field_index(name).ok_or_else(|| {
            EngineError::schema_mismatch(at, format!("record {} has no key field {name}", ty.name()))
        })?;
        if let Some((_, slot)) = entry.slot_mut(idx) {
            *slot = Some(ytree_tree::BoundNode::Leaf(value.clone()));
        }
    }
    Ok(entry)
}
