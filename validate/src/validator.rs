//! Validator facade: per-value checks used by the engine on install, and
//! the whole-schema / whole-tree passes layered on top.

use crate::error::{ValidateResult, ValidationError};
use crate::kinds::*;
use crate::list::validate_list_schema;
use crate::pattern::PatternCache;
use crate::violation::{Violation, Violations};
use tracing::debug;
use ytree_core::{Path, PathElem, Value};
use ytree_schema::{Kind, LeafType, Schema, SchemaId, SchemaKind, SchemaNode};
use ytree_tree::{BoundNode, Container, ListKey};

/// Owns the compiled-pattern cache; everything else is stateless.
#[derive(Debug, Default)]
pub struct Validator {
    patterns: PatternCache,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    /// Check that a leaf type's restrictions are well-formed.
    pub fn validate_kind_schema(&self, ty: &LeafType) -> ValidateResult<()> {
        match ty.kind {
            Kind::String | Kind::Binary => validate_string_schema(ty, &self.patterns),
            Kind::Bits => validate_bits_schema(ty),
            Kind::Enumeration | Kind::Identityref => validate_enum_schema(ty),
            Kind::Union => {
                if ty.members.is_empty() {
                    return Err(ValidationError::schema("union", "no member types"));
                }
                ty.members.iter().try_for_each(|m| self.validate_kind_schema(m))
            }
            k if k.is_numeric() => validate_range_schema(ty),
            _ => Ok(()),
        }
    }

    /// Check a coerced scalar against a leaf type's restrictions.
    pub fn validate_kind_value(&self, ty: &LeafType, value: &Value) -> ValidateResult<()> {
        let wrong = || ValidationError::kind(ty.kind.name(), value.type_name());
        match ty.kind {
            Kind::String => validate_string(ty, value.as_str().ok_or_else(wrong)?, &self.patterns),
            Kind::Bits => validate_bits(ty, value.as_str().ok_or_else(wrong)?),
            Kind::Enumeration | Kind::Identityref => match value {
                Value::Enum(name) | Value::String(name) => validate_enum(ty, name),
                _ => Err(wrong()),
            },
            Kind::Binary => match value {
                Value::Binary(bytes) => validate_binary(ty, bytes),
                _ => Err(wrong()),
            },
            Kind::Bool => value.as_bool().map(|_| ()).ok_or_else(wrong),
            Kind::Empty => match value {
                Value::Empty => Ok(()),
                _ => Err(wrong()),
            },
            Kind::Union => {
                let mut last = wrong();
                for member in &ty.members {
                    let Ok(coerced) = member.coerce(value.clone()) else {
                        continue;
                    };
                    match self.validate_kind_value(member, &coerced) {
                        Ok(()) => return Ok(()),
                        Err(e) => last = e,
                    }
                }
                Err(last)
            }
            _ => validate_range(ty, value),
        }
    }

    /// Check a value about to be written to a leaf or leaf-list.
    pub fn validate_value(&self, node: &SchemaNode, value: &Value) -> ValidateResult<()> {
        let ty = node
            .leaf_type
            .as_ref()
            .ok_or_else(|| ValidationError::schema(node.name.clone(), "node has no leaf type"))?;
        match value {
            Value::List(items) if node.is_leaf_list() => {
                if node.config {
                    validate_slice(items, |v| self.validate_kind_value(ty, v))
                } else {
                    items.iter().try_for_each(|v| self.validate_kind_value(ty, v))
                }
            }
            _ => self.validate_kind_value(ty, value),
        }
    }

    /// Run every schema check over the whole schema.
    pub fn validate_schema(&self, schema: &Schema) -> Violations {
        let mut violations = Violations::new();
        for node in schema.iter() {
            let result = match node.kind {
                SchemaKind::List => validate_list_schema(schema, node.id),
                SchemaKind::Leaf | SchemaKind::LeafList => match &node.leaf_type {
                    Some(ty) => self.validate_kind_schema(ty),
                    None => Err(ValidationError::schema(node.name.clone(), "no leaf type")),
                },
                _ => Ok(()),
            };
            if let Err(e) = result {
                violations.push(Violation::new(display(schema, node.id), e.to_string()));
            }
        }
        debug!(nodes = schema.len(), violations = violations.len(), "validated schema");
        violations
    }

    /// Check every value in a bound tree against its schema.
    pub fn validate_tree(&self, schema: &Schema, id: SchemaId, root: &Container) -> Violations {
        let mut violations = Violations::new();
        self.walk_container(schema, id, root, &Path::root(), &mut violations);
        debug!(violations = violations.len(), "validated tree");
        violations
    }

    fn walk_container(
        &self,
        schema: &Schema,
        id: SchemaId,
        container: &Container,
        at: &Path,
        out: &mut Violations,
    ) {
        for (field, value) in container.fields() {
            let Some(value) = value else { continue };
            if field.is_annotation() {
                continue;
            }
            let Some(rel) = field.paths.first() else { continue };
            let mut path = at.clone();
            for seg in rel {
                path.push(PathElem::new(seg.as_str()));
            }
            let Some(child) = schema.descend(id, rel) else {
                out.push(Violation::new(
                    path.canonical(),
                    format!("field {} binds to no schema node", field.name),
                ));
                continue;
            };
            self.walk_node(schema, child, value, &path, out);
        }
    }

    fn walk_node(
        &self,
        schema: &Schema,
        id: SchemaId,
        value: &BoundNode,
        at: &Path,
        out: &mut Violations,
    ) {
        let Some(node) = schema.get(id) else { return };
        let result = match value {
            BoundNode::Leaf(v) => self.validate_value(node, v),
            BoundNode::LeafList(items) => self.validate_value(node, &Value::List(items.clone())),
            _ => Ok(()),
        };
        if let Err(e) = result {
            out.push(Violation::new(at.canonical(), e.to_string()));
        }
        match value {
            BoundNode::Leaf(_) | BoundNode::LeafList(_) | BoundNode::Annotation(_) => {}
            BoundNode::Container(c) => self.walk_container(schema, id, c, at, out),
            BoundNode::List(_) | BoundNode::OrderedList(_) => {
                let Some(entries) = value.as_entries() else { return };
                for (key, entry) in entries.entries() {
                    let path = entry_path(node, key, at);
                    self.walk_container(schema, id, entry, &path, out);
                }
            }
        }
    }
}

/// Replace the last element of `at` with one carrying the entry's key predicate.
fn entry_path(list: &SchemaNode, key: &ListKey, at: &Path) -> Path {
    let mut elems = at.elems().to_vec();
    if let Some(last) = elems.pop() {
        let mut elem = PathElem::new(last.name);
        if list.keys.is_empty() {
            elem = elem.with_key("#", key.to_string());
        } else {
            for (name, value) in list.keys.iter().zip(key.values()) {
                elem = elem.with_key(name.as_str(), value.to_key_string());
            }
        }
        elems.push(elem);
    }
    Path::new(elems)
}

fn display(schema: &Schema, id: SchemaId) -> String {
    format!("/{}", schema.path_of(id).join("/"))
}
