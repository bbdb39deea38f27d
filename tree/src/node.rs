//! Bound data nodes.
//!
//! `BoundNode` is the closed set of data shapes a schema node can be bound
//! to. Containers hold one optional slot per field of their record type;
//! `None` means the field is unset.

use crate::error::{TreeError, TreeResult};
use crate::record::{FieldDescriptor, RecordType};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use ytree_core::Value;

/// In-memory data counterpart of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundNode {
    Leaf(Value),
    LeafList(Vec<Value>),
    Container(Container),
    List(KeyedList),
    OrderedList(OrderedList),
    Annotation(serde_json::Value),
}

impl BoundNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            BoundNode::Leaf(_) => "leaf",
            BoundNode::LeafList(_) => "leaf-list",
            BoundNode::Container(_) => "container",
            BoundNode::List(_) => "list",
            BoundNode::OrderedList(_) => "ordered list",
            BoundNode::Annotation(_) => "annotation",
        }
    }

    /// Returns true if the node holds no data.
    pub fn is_empty(&self) -> bool {
        match self {
            BoundNode::Leaf(_) | BoundNode::Annotation(_) => false,
            BoundNode::LeafList(items) => items.is_empty(),
            BoundNode::Container(c) => c.is_empty(),
            BoundNode::List(l) => l.is_empty(),
            BoundNode::OrderedList(l) => l.is_empty(),
        }
    }

    pub fn as_leaf(&self) -> Option<&Value> {
        match self {
            BoundNode::Leaf(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_leaf_list(&self) -> Option<&[Value]> {
        match self {
            BoundNode::LeafList(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            BoundNode::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut Container> {
        match self {
            BoundNode::Container(c) => Some(c),
            _ => None,
        }
    }

    /// View either list flavour through the shared entry-map interface.
    pub fn as_entries(&self) -> Option<&dyn EntryMap> {
        match self {
            BoundNode::List(l) => Some(l),
            BoundNode::OrderedList(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_entries_mut(&mut self) -> Option<&mut dyn EntryMap> {
        match self {
            BoundNode::List(l) => Some(l),
            BoundNode::OrderedList(l) => Some(l),
            _ => None,
        }
    }
}

/// Key tuple of a list entry, in schema key order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListKey(Vec<Value>);

impl ListKey {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn single(value: impl Into<Value>) -> Self {
        Self(vec![value.into()])
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(Value::to_key_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// A record instance: one slot per field of its record type.
#[derive(Debug, Clone)]
pub struct Container {
    ty: Arc<RecordType>,
    slots: Vec<Option<BoundNode>>,
}

impl Container {
    /// Create a container with every field unset.
    pub fn new(ty: Arc<RecordType>) -> Self {
        let slots = vec![None; ty.fields().len()];
        Self { ty, slots }
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.ty
    }

    /// Iterate fields with their current values.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, Option<&BoundNode>)> {
        self.ty
            .fields()
            .iter()
            .zip(self.slots.iter().map(Option::as_ref))
    }

    /// Iterate fields with mutable access to their slots.
    pub fn fields_mut(&mut self) -> impl Iterator<Item = (&FieldDescriptor, &mut Option<BoundNode>)> {
        self.ty.fields().iter().zip(self.slots.iter_mut())
    }

    /// Get the value of field `idx`.
    pub fn get(&self, idx: usize) -> Option<&BoundNode> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    /// Get the descriptor and slot of field `idx`.
    pub fn slot_mut(&mut self, idx: usize) -> Option<(&FieldDescriptor, &mut Option<BoundNode>)> {
        let desc = self.ty.fields().get(idx)?;
        let slot = self.slots.get_mut(idx)?;
        Some((desc, slot))
    }

    /// Get the value of the field called `name`.
    pub fn field(&self, name: &str) -> Option<&BoundNode> {
        self.ty.field_index(name).and_then(|idx| self.get(idx))
    }

    /// Get the slot of the field called `name`.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Option<BoundNode>> {
        let idx = self.ty.field_index(name)?;
        self.slots.get_mut(idx)
    }

    /// Get a leaf field's value.
    pub fn leaf(&self, name: &str) -> Option<&Value> {
        self.field(name).and_then(BoundNode::as_leaf)
    }

    /// Set a field's value.
    pub fn set(&mut self, name: &str, node: BoundNode) -> TreeResult<()> {
        let ty_name = self.ty.name().to_string();
        let slot = self
            .field_mut(name)
            .ok_or_else(|| TreeError::unknown_field(ty_name, name))?;
        *slot = Some(node);
        Ok(())
    }

    /// Set a leaf field's value.
    pub fn set_leaf(&mut self, name: &str, value: impl Into<Value>) -> TreeResult<()> {
        self.set(name, BoundNode::Leaf(value.into()))
    }

    /// Returns true if no field holds data.
    pub fn is_empty(&self) -> bool {
        self.slots
            .iter()
            .all(|s| s.as_ref().map_or(true, BoundNode::is_empty))
    }

    /// Unset every field.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.ty, &other.ty) || self.ty.name() == other.ty.name())
            && self.slots == other.slots
    }
}

/// Uniform access to list entries regardless of ordering discipline.
pub trait EntryMap {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn get_entry(&self, key: &ListKey) -> Option<&Container>;
    fn get_entry_mut(&mut self, key: &ListKey) -> Option<&mut Container>;
    /// Keys in visiting order.
    fn keys(&self) -> Vec<ListKey>;
    /// Add a new entry; fails if the key is already present.
    fn insert_entry(&mut self, key: ListKey, entry: Container) -> TreeResult<()>;
    fn remove_entry(&mut self, key: &ListKey) -> Option<Container>;
    /// Entries in visiting order.
    fn entries(&self) -> Vec<(&ListKey, &Container)>;
}

/// List addressed by key, visited in key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyedList {
    entries: BTreeMap<ListKey, Container>,
}

impl KeyedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ListKey, &Container)> {
        self.entries.iter()
    }
}

impl EntryMap for KeyedList {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn get_entry(&self, key: &ListKey) -> Option<&Container> {
        self.entries.get(key)
    }

    fn get_entry_mut(&mut self, key: &ListKey) -> Option<&mut Container> {
        self.entries.get_mut(key)
    }

    fn keys(&self) -> Vec<ListKey> {
        self.entries.keys().cloned().collect()
    }

    fn insert_entry(&mut self, key: ListKey, entry: Container) -> TreeResult<()> {
        if self.entries.contains_key(&key) {
            return Err(TreeError::DuplicateKey(key.to_string()));
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    fn remove_entry(&mut self, key: &ListKey) -> Option<Container> {
        self.entries.remove(key)
    }

    fn entries(&self) -> Vec<(&ListKey, &Container)> {
        self.entries.iter().collect()
    }
}

/// List visited in insertion order. New entries are always appended.
#[derive(Debug, Clone, Default)]
pub struct OrderedList {
    entries: IndexMap<ListKey, Container>,
}

impl OrderedList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the end.
    pub fn append(&mut self, key: ListKey, entry: Container) -> TreeResult<()> {
        if self.entries.contains_key(&key) {
            return Err(TreeError::DuplicateKey(key.to_string()));
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    /// Visit entries in order until `f` breaks.
    pub fn range<F>(&self, mut f: F)
    where
        F: FnMut(&ListKey, &Container) -> ControlFlow<()>,
    {
        for (key, entry) in &self.entries {
            if f(key, entry).is_break() {
                break;
            }
        }
    }

    /// Remove an entry, keeping the order of the rest.
    pub fn delete(&mut self, key: &ListKey) -> Option<Container> {
        self.entries.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ListKey, &Container)> {
        self.entries.iter()
    }
}

impl PartialEq for OrderedList {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().zip(other.entries.iter()).all(|(a, b)| a == b)
    }
}

impl EntryMap for OrderedList {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn get_entry(&self, key: &ListKey) -> Option<&Container> {
        self.entries.get(key)
    }

    fn get_entry_mut(&mut self, key: &ListKey) -> Option<&mut Container> {
        self.entries.get_mut(key)
    }

    fn keys(&self) -> Vec<ListKey> {
        self.entries.keys().cloned().collect()
    }

    fn insert_entry(&mut self, key: ListKey, entry: Container) -> TreeResult<()> {
        self.append(key, entry)
    }

    fn remove_entry(&mut self, key: &ListKey) -> Option<Container> {
        self.delete(key)
    }

    fn entries(&self) -> Vec<(&ListKey, &Container)> {
        self.entries.iter().collect()
    }
}

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a data tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(u64);

impl TreeId {
    fn next() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A root container with an identity.
#[derive(Debug)]
pub struct DataTree {
    id: TreeId,
    root: Container,
}

impl DataTree {
    /// Create an empty tree rooted at a record of type `ty`.
    pub fn new(ty: Arc<RecordType>) -> Self {
        Self::from_root(Container::new(ty))
    }

    pub fn from_root(root: Container) -> Self {
        Self {
            id: TreeId::next(),
            root,
        }
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn root(&self) -> &Container {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Container {
        &mut self.root
    }
}

impl Clone for DataTree {
    /// A clone is a distinct tree and gets its own identity.
    fn clone(&self) -> Self {
        Self::from_root(self.root.clone())
    }
}
