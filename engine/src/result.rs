//! Resolution result types.

use std::fmt;
use ytree_core::{Path, Value};
use ytree_schema::SchemaId;
use ytree_tree::{BoundNode, Container, FieldDescriptor, ListKey};

/// A value to install at a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A decoded scalar, or a whole leaf-list as `Value::List`.
    Scalar(Value),
    /// A tree-shaped payload handed to the decoder.
    Structured(serde_json::Value),
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        Payload::Scalar(v)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(v: serde_json::Value) -> Self {
        Payload::Structured(v)
    }
}

/// One step of a physical location inside a tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Field slot of the current container.
    Field(usize),
    /// Entry of the list in the current slot.
    Entry(ListKey),
}

/// Physical address of a node: field slots and list entries from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location(Vec<Step>);

impl Location {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push(&mut self, step: Step) {
        self.0.push(step);
    }

    /// Location of the enclosing node.
    pub fn parent(&self) -> Location {
        let mut steps = self.0.clone();
        steps.pop();
        Location(steps)
    }

    /// Follow this location to a field slot, if it still exists.
    pub fn slot_mut<'a>(
        &self,
        root: &'a mut Container,
    ) -> Option<(&'a FieldDescriptor, &'a mut Option<BoundNode>)> {
        let (last, prefix) = self.0.split_last()?;
        let Step::Field(idx) = last else { return None };
        let mut current = root;
        let mut steps = prefix.iter();
        while let Some(step) = steps.next() {
            let Step::Field(i) = step else { return None };
            let node = current.slot_mut(*i)?.1.as_mut()?;
            current = match node {
                BoundNode::Container(c) => c,
                other => {
                    let Some(Step::Entry(key)) = steps.next() else {
                        return None;
                    };
                    other.as_entries_mut()?.get_entry_mut(key)?
                }
            };
        }
        current.slot_mut(*idx)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.0 {
            match step {
                Step::Field(i) => write!(f, ".{i}")?,
                Step::Entry(k) => write!(f, "[{k}]")?,
            }
        }
        Ok(())
    }
}

/// Borrowed view of resolved data.
#[derive(Debug, Clone, Copy)]
pub enum DataRef<'a> {
    /// A node held in a field slot.
    Node(&'a BoundNode),
    /// A list entry or the root.
    Container(&'a Container),
}

impl<'a> DataRef<'a> {
    pub fn as_leaf(&self) -> Option<&'a Value> {
        match self {
            DataRef::Node(n) => n.as_leaf(),
            DataRef::Container(_) => None,
        }
    }

    pub fn as_leaf_list(&self) -> Option<&'a [Value]> {
        match self {
            DataRef::Node(n) => n.as_leaf_list(),
            DataRef::Container(_) => None,
        }
    }

    pub fn as_container(&self) -> Option<&'a Container> {
        match self {
            DataRef::Node(n) => n.as_container(),
            DataRef::Container(c) => Some(c),
        }
    }

    pub fn as_node(&self) -> Option<&'a BoundNode> {
        match self {
            DataRef::Node(n) => Some(n),
            DataRef::Container(_) => None,
        }
    }
}

/// A node found by a read.
#[derive(Debug, Clone)]
pub struct ResolvedNode<'a> {
    pub schema: SchemaId,
    /// `None` when the node is found but unset.
    pub data: Option<DataRef<'a>>,
    /// Canonical absolute path.
    pub path: Path,
    pub location: Location,
}

impl<'a> ResolvedNode<'a> {
    pub fn leaf(&self) -> Option<&'a Value> {
        self.data.as_ref().and_then(DataRef::as_leaf)
    }
}

/// A node reached by a mutating resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub schema: SchemaId,
    /// Canonical absolute path.
    pub path: Path,
    pub location: Location,
    /// Whether the node holds data after the operation.
    pub present: bool,
    /// The node is a list key leaf; its value cannot change in place.
    pub pinned: bool,
}
