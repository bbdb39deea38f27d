//! The Schema - immutable schema tree lookup.

use crate::{LeafType, SchemaId, SchemaKind};
use std::collections::HashMap;

/// One modeled schema element.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Identifier within the owning schema.
    pub id: SchemaId,
    /// Node name (the root has an empty name).
    pub name: String,
    /// Node kind.
    pub kind: SchemaKind,
    /// Parent node (None for the root).
    pub parent: Option<SchemaId>,
    /// Children in declaration order.
    pub children: Vec<SchemaId>,
    /// Key leaf names of a list, in declaration order. Empty means unkeyed.
    pub keys: Vec<String>,
    /// Declared type for leaves and leaf-lists.
    pub leaf_type: Option<LeafType>,
    /// Whether a list or leaf-list is `ordered-by user`.
    pub ordered_by_user: bool,
    /// Whether the node is configuration (false for state data).
    pub config: bool,
    pub(crate) child_index: HashMap<String, SchemaId>,
}

impl SchemaNode {
    pub(crate) fn new(id: SchemaId, name: String, kind: SchemaKind) -> Self {
        Self {
            id,
            name,
            kind,
            parent: None,
            children: Vec::new(),
            keys: Vec::new(),
            leaf_type: None,
            ordered_by_user: false,
            config: true,
            child_index: HashMap::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == SchemaKind::Leaf
    }

    pub fn is_leaf_list(&self) -> bool {
        self.kind == SchemaKind::LeafList
    }

    pub fn is_container(&self) -> bool {
        self.kind == SchemaKind::Container
    }

    pub fn is_list(&self) -> bool {
        self.kind == SchemaKind::List
    }

    /// Returns true for a list declared without keys.
    pub fn is_unkeyed_list(&self) -> bool {
        self.is_list() && self.keys.is_empty()
    }

    /// Get a direct child by name (does not look through choices).
    pub fn direct_child(&self, name: &str) -> Option<SchemaId> {
        self.child_index.get(name).copied()
    }
}

/// The Schema provides runtime lookup of schema nodes.
/// It is immutable after construction.
#[derive(Debug, Clone)]
pub struct Schema {
    nodes: Vec<SchemaNode>,
}

impl Schema {
    /// Create a schema (use SchemaBuilder for construction).
    pub(crate) fn new(nodes: Vec<SchemaNode>) -> Self {
        Self { nodes }
    }

    /// The root node (a container).
    pub fn root(&self) -> SchemaId {
        SchemaId::new(0)
    }

    /// Get a node by ID.
    pub fn get(&self, id: SchemaId) -> Option<&SchemaNode> {
        self.nodes.get(id.index())
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get all nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.iter()
    }

    /// Get the data child named `name`, looking through choice and case
    /// nodes, which are never addressable themselves.
    pub fn child(&self, id: SchemaId, name: &str) -> Option<SchemaId> {
        let node = self.get(id)?;
        if let Some(child) = node.direct_child(name) {
            if self.get(child).map_or(false, |c| c.kind.is_data()) {
                return Some(child);
            }
        }
        node.children
            .iter()
            .filter_map(|c| self.get(*c))
            .filter(|c| !c.kind.is_data())
            .find_map(|c| self.child(c.id, name))
    }

    /// Walk a sequence of names from `id`.
    pub fn descend<S: AsRef<str>>(&self, id: SchemaId, names: &[S]) -> Option<SchemaId> {
        names
            .iter()
            .try_fold(id, |current, name| self.child(current, name.as_ref()))
    }

    /// Get the nearest ancestor that is a data node.
    pub fn data_parent(&self, id: SchemaId) -> Option<SchemaId> {
        let mut current = self.get(id)?.parent;
        while let Some(pid) = current {
            let parent = self.get(pid)?;
            if parent.kind.is_data() {
                return Some(pid);
            }
            current = parent.parent;
        }
        None
    }

    /// Names of the data nodes from the root down to `id`.
    pub fn path_of(&self, id: SchemaId) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(cid) = current {
            if cid == self.root() {
                break;
            }
            let Some(node) = self.get(cid) else { break };
            if node.kind.is_data() {
                names.push(node.name.clone());
            }
            current = node.parent;
        }
        names.reverse();
        names
    }

    /// Get the key leaf named `key` of list `list`.
    pub fn key_leaf(&self, list: SchemaId, key: &str) -> Option<&SchemaNode> {
        let node = self.get(list)?;
        if !node.keys.iter().any(|k| k == key) {
            return None;
        }
        self.child(list, key)
            .and_then(|id| self.get(id))
            .filter(|n| n.is_leaf())
    }
}
