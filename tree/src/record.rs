//! Per-record field descriptor tables.
//!
//! A `RecordType` plays the role of a generated record definition: it
//! lists every field with the schema path(s) it binds to. A field can bind
//! to several primary paths (`"name|config/name"`) and, separately, to
//! shadow paths that name the same leaf elsewhere in the uncompressed tree.

use crate::BoundNode;
use crate::{Container, KeyedList, OrderedList};
use std::sync::Arc;

/// Schema path relative to the record's own schema node.
pub type SchemaPath = Vec<String>;

/// Structural shape of a field's value.
#[derive(Debug, Clone)]
pub enum FieldShape {
    Leaf,
    LeafList,
    Container(Arc<RecordType>),
    List {
        entry: Arc<RecordType>,
        ordered: bool,
    },
    /// Out-of-band metadata with no schema.
    Annotation,
}

/// Binding of one field to the schema.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Primary schema paths, in declaration order.
    pub paths: Vec<SchemaPath>,
    /// Shadow schema paths, in declaration order.
    pub shadow_paths: Vec<SchemaPath>,
    /// Value shape.
    pub shape: FieldShape,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, paths: &str, shape: FieldShape) -> Self {
        Self {
            name: name.into(),
            paths: parse_paths(paths),
            shadow_paths: Vec::new(),
            shape,
        }
    }

    pub fn is_annotation(&self) -> bool {
        matches!(self.shape, FieldShape::Annotation)
    }

    /// The value a materialized field starts from. Leaves stay unset until
    /// a value is installed.
    pub fn zero(&self) -> Option<BoundNode> {
        match &self.shape {
            FieldShape::Leaf | FieldShape::Annotation => None,
            FieldShape::LeafList => Some(BoundNode::LeafList(Vec::new())),
            FieldShape::Container(ty) => Some(BoundNode::Container(Container::new(ty.clone()))),
            FieldShape::List { ordered: false, .. } => Some(BoundNode::List(KeyedList::new())),
            FieldShape::List { ordered: true, .. } => {
                Some(BoundNode::OrderedList(OrderedList::new()))
            }
        }
    }
}

/// Parse a `|`-separated list of `/`-separated schema paths.
pub fn parse_paths(tag: &str) -> Vec<SchemaPath> {
    tag.split('|')
        .map(|p| {
            p.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<SchemaPath>()
        })
        .filter(|p| !p.is_empty())
        .collect()
}

/// Descriptor table of one record type.
#[derive(Debug)]
pub struct RecordType {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl RecordType {
    /// Start building a record type.
    pub fn builder(name: impl Into<String>) -> RecordBuilder {
        RecordBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Index of the field called `name`.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Index of the leaf field holding list key `key`: the first leaf whose
    /// primary path ends in `key`.
    pub fn key_field_index(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|f| {
            matches!(f.shape, FieldShape::Leaf)
                && f.paths.iter().any(|p| p.last().map(String::as_str) == Some(key))
        })
    }
}

/// Builder for a record type.
pub struct RecordBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl RecordBuilder {
    /// Add a leaf field.
    pub fn leaf(self, name: impl Into<String>, paths: &str) -> Self {
        self.field(FieldDescriptor::new(name, paths, FieldShape::Leaf))
    }

    /// Add a leaf-list field.
    pub fn leaf_list(self, name: impl Into<String>, paths: &str) -> Self {
        self.field(FieldDescriptor::new(name, paths, FieldShape::LeafList))
    }

    /// Add a container field.
    pub fn container(self, name: impl Into<String>, paths: &str, ty: Arc<RecordType>) -> Self {
        self.field(FieldDescriptor::new(name, paths, FieldShape::Container(ty)))
    }

    /// Add a keyed list field.
    pub fn list(self, name: impl Into<String>, paths: &str, entry: Arc<RecordType>) -> Self {
        let shape = FieldShape::List {
            entry,
            ordered: false,
        };
        self.field(FieldDescriptor::new(name, paths, shape))
    }

    /// Add an insertion-ordered list field.
    pub fn ordered_list(self, name: impl Into<String>, paths: &str, entry: Arc<RecordType>) -> Self {
        let shape = FieldShape::List {
            entry,
            ordered: true,
        };
        self.field(FieldDescriptor::new(name, paths, shape))
    }

    /// Add an annotation field.
    pub fn annotation(self, name: impl Into<String>) -> Self {
        self.field(FieldDescriptor {
            name: name.into(),
            paths: Vec::new(),
            shadow_paths: Vec::new(),
            shape: FieldShape::Annotation,
        })
    }

    /// Attach shadow paths to the most recently added field.
    pub fn shadow(mut self, paths: &str) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.shadow_paths = parse_paths(paths);
        }
        self
    }

    /// Add an arbitrary descriptor.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Finish building this record type.
    pub fn build(self) -> Arc<RecordType> {
        Arc::new(RecordType {
            name: self.name,
            fields: self.fields,
        })
    }
}
