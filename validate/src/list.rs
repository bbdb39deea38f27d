//! List schema validation.

use crate::error::{ValidateResult, ValidationError};
use ytree_schema::{Schema, SchemaId};

/// A list must have children and keys, and every key must name a leaf
/// child. State lists may be unkeyed.
pub fn validate_list_schema(schema: &Schema, id: SchemaId) -> ValidateResult<()> {
    let node = schema
        .get(id)
        .ok_or_else(|| ValidationError::schema(id.to_string(), "unknown schema node"))?;
    let name = || schema.path_of(id).join("/");
    if !node.is_list() {
        return Err(ValidationError::schema(name(), "not a list"));
    }
    if node.children.is_empty() {
        return Err(ValidationError::schema(name(), "list has no children"));
    }
    if node.keys.is_empty() {
        if node.config {
            return Err(ValidationError::schema(name(), "config list has no keys"));
        }
        return Ok(());
    }
    match node.keys.iter().find(|k| schema.key_leaf(id, k).is_none()) {
        Some(key) => Err(ValidationError::schema(
            name(),
            format!("key {key} is not a leaf child"),
        )),
        None => Ok(()),
    }
}
