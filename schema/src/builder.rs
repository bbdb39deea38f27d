//! SchemaBuilder for constructing an immutable Schema.

use crate::{LeafType, Schema, SchemaId, SchemaKind, SchemaNode};
use thiserror::Error;

/// Errors that can occur during schema construction.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Unknown parent node: {0}")]
    UnknownParent(SchemaId),

    #[error("Node {parent} cannot have children (adding {name})")]
    NotADirectory { parent: String, name: String },

    #[error("Duplicate child name {name} under {parent}")]
    DuplicateChild { parent: String, name: String },

    #[error("Empty node name under {0}")]
    EmptyName(String),
}

/// Builder for constructing an immutable Schema.
#[derive(Debug)]
pub struct SchemaBuilder {
    nodes: Vec<SchemaNode>,
}

impl SchemaBuilder {
    /// Create a new builder whose root container is named `root_name`.
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = SchemaNode::new(SchemaId::new(0), root_name.into(), SchemaKind::Container);
        Self { nodes: vec![root] }
    }

    /// The root container.
    pub fn root(&self) -> SchemaId {
        SchemaId::new(0)
    }

    /// Add a container.
    pub fn add_container(&mut self, parent: SchemaId, name: impl Into<String>) -> NodeBuilder<'_> {
        self.node(parent, name, SchemaKind::Container, None)
    }

    /// Add a list. Declare its keys with `key`.
    pub fn add_list(&mut self, parent: SchemaId, name: impl Into<String>) -> NodeBuilder<'_> {
        self.node(parent, name, SchemaKind::List, None)
    }

    /// Add a leaf of the given type.
    pub fn add_leaf(
        &mut self,
        parent: SchemaId,
        name: impl Into<String>,
        leaf_type: LeafType,
    ) -> NodeBuilder<'_> {
        self.node(parent, name, SchemaKind::Leaf, Some(leaf_type))
    }

    /// Add a leaf-list of the given element type.
    pub fn add_leaf_list(
        &mut self,
        parent: SchemaId,
        name: impl Into<String>,
        leaf_type: LeafType,
    ) -> NodeBuilder<'_> {
        self.node(parent, name, SchemaKind::LeafList, Some(leaf_type))
    }

    /// Add a choice.
    pub fn add_choice(&mut self, parent: SchemaId, name: impl Into<String>) -> NodeBuilder<'_> {
        self.node(parent, name, SchemaKind::Choice, None)
    }

    /// Add a case under a choice.
    pub fn add_case(&mut self, parent: SchemaId, name: impl Into<String>) -> NodeBuilder<'_> {
        self.node(parent, name, SchemaKind::Case, None)
    }

    fn node(
        &mut self,
        parent: SchemaId,
        name: impl Into<String>,
        kind: SchemaKind,
        leaf_type: Option<LeafType>,
    ) -> NodeBuilder<'_> {
        NodeBuilder {
            builder: self,
            parent,
            name: name.into(),
            kind,
            keys: Vec::new(),
            leaf_type,
            ordered_by_user: false,
            state: false,
        }
    }

    /// Build the immutable Schema.
    pub fn build(self) -> Schema {
        Schema::new(self.nodes)
    }
}

/// Builder for one schema node.
pub struct NodeBuilder<'a> {
    builder: &'a mut SchemaBuilder,
    parent: SchemaId,
    name: String,
    kind: SchemaKind,
    keys: Vec<String>,
    leaf_type: Option<LeafType>,
    ordered_by_user: bool,
    state: bool,
}

impl<'a> NodeBuilder<'a> {
    /// Add a key leaf name (lists only; order is significant).
    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.keys.push(name.into());
        self
    }

    /// Mark as `ordered-by user`.
    pub fn ordered_by_user(mut self) -> Self {
        self.ordered_by_user = true;
        self
    }

    /// Mark as state data (`config false`).
    pub fn state(mut self) -> Self {
        self.state = true;
        self
    }

    /// Finish building this node.
    pub fn done(self) -> Result<SchemaId, SchemaError> {
        let parent = self
            .builder
            .nodes
            .get(self.parent.index())
            .ok_or(SchemaError::UnknownParent(self.parent))?;

        if parent.kind.is_leaf_like() {
            return Err(SchemaError::NotADirectory {
                parent: parent.name.clone(),
                name: self.name,
            });
        }
        if self.name.is_empty() {
            return Err(SchemaError::EmptyName(parent.name.clone()));
        }
        if parent.child_index.contains_key(&self.name) {
            return Err(SchemaError::DuplicateChild {
                parent: parent.name.clone(),
                name: self.name,
            });
        }
        let config = parent.config && !self.state;

        let id = SchemaId::new(self.builder.nodes.len() as u32);
        let mut node = SchemaNode::new(id, self.name.clone(), self.kind);
        node.parent = Some(self.parent);
        node.keys = self.keys;
        node.leaf_type = self.leaf_type;
        node.ordered_by_user = self.ordered_by_user;
        node.config = config;
        self.builder.nodes.push(node);

        let parent = &mut self.builder.nodes[self.parent.index()];
        parent.children.push(id);
        parent.child_index.insert(self.name, id);

        Ok(id)
    }
}
