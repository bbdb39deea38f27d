//! Mutating traversal.
//!
//! Materialization happens on the way down, so a call that fails part way
//! may leave new empty containers or list entries behind. Erase prunes any
//! container, list or list entry it leaves empty, except the root.

use super::fields::{match_field, shape_matches};
use super::keys::{new_entry, EntryGuard, KeyFilter};
use super::{descend, schema_node, unmatched, Ctx, Trail};
use crate::error::{EngineError, EngineResult};
use crate::result::{Payload, Resolved};
use std::collections::BTreeMap;
use tracing::trace;
use ytree_core::{PathElem, Value};
use ytree_schema::{LeafType, SchemaId, SchemaKind, SchemaNode};
use ytree_tree::{json_to_value, BoundNode, Container, FieldDescriptor, FieldShape, ListKey};

/// What to do at the end of the path.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Mode<'p> {
    /// Create missing containers and list entries.
    Materialize,
    /// Materialize, then write the payload.
    Install(&'p Payload),
    /// Remove the node and prune emptied ancestors.
    Erase,
}

impl Mode<'_> {
    fn is_erase(&self) -> bool {
        matches!(self, Mode::Erase)
    }
}

/// Resolve `path` under `root`, applying `mode`.
pub(crate) fn write(
    ctx: &Ctx<'_>,
    id: SchemaId,
    root: &mut Container,
    path: &[PathElem],
    mode: Mode<'_>,
) -> EngineResult<Vec<Resolved>> {
    let trail = Trail::default();
    if !path.is_empty() {
        return write_container(ctx, id, root, path, &trail, mode, None);
    }
    let present = match mode {
        Mode::Materialize => !root.is_empty(),
        Mode::Install(payload) => {
            install_container(ctx, id, root, payload, &trail, None)?;
            true
        }
        Mode::Erase => {
            root.clear();
            false
        }
    };
    Ok(vec![resolved(id, &trail, present, false)])
}

fn resolved(schema: SchemaId, trail: &Trail, present: bool, pinned: bool) -> Resolved {
    Resolved {
        schema,
        path: trail.path.clone(),
        location: trail.location.clone(),
        present,
        pinned,
    }
}

fn write_container(
    ctx: &Ctx<'_>,
    id: SchemaId,
    container: &mut Container,
    path: &[PathElem],
    trail: &Trail,
    mode: Mode<'_>,
    guard: Option<&EntryGuard<'_>>,
) -> EngineResult<Vec<Resolved>> {
    let ty = container.record_type().clone();
    trace!(at = %trail.path, record = ty.name(), ?mode, "write container");
    let Some(m) = match_field(&ty, path, ctx.opts) else {
        return unmatched(ctx, trail, &path[0]);
    };
    let child = descend(ctx, id, m.schema_path, trail)?;
    let next = trail.field(m.index, m.schema_path);
    if m.alternate {
        // Alternate leaves are terminal and never hold data.
        return Ok(vec![resolved(child, &next, false, false)]);
    }

    let node = schema_node(ctx, child, &next)?;
    let (field, slot) = container.slot_mut(m.index).ok_or_else(|| {
        EngineError::schema_mismatch(next.at(None), format!("record {} has no field {}", ty.name(), m.index))
    })?;
    if !shape_matches(&field.shape, node) {
        return Err(EngineError::schema_mismatch(
            next.at(None),
            format!("field {} does not fit a {:?} node", field.name, node.kind),
        ));
    }
    let consumed = m.schema_path.len();
    let elem = &path[consumed - 1];
    let rest = &path[consumed..];

    let results = if node.is_list() {
        write_list(ctx, node, field, slot, &elem.keys, rest, &next, mode)?
    } else if elem.has_keys() {
        return Err(EngineError::schema_mismatch(
            next.at(None),
            format!("{} is not a list", node.name),
        ));
    } else {
        let pinned = guard.and_then(|g| g.pinned(&ty, m.index));
        write_slot(ctx, node, field, slot, rest, &next, mode, pinned)?
    };

    if mode.is_erase() && slot.as_ref().map_or(false, BoundNode::is_empty) {
        trace!(at = %next.path, "pruning empty node");
        *slot = None;
    }
    Ok(results)
}

#[allow(clippy::too_many_arguments)]
fn write_slot(
    ctx: &Ctx<'_>,
    node: &SchemaNode,
    field: &FieldDescriptor,
    slot: &mut Option<BoundNode>,
    rest: &[PathElem],
    trail: &Trail,
    mode: Mode<'_>,
    pinned: Option<Value>,
) -> EngineResult<Vec<Resolved>> {
    if rest.is_empty() {
        return terminal(ctx, node, field, slot, trail, mode, pinned.as_ref());
    }
    if slot.is_none() {
        if mode.is_erase() {
            return Ok(Vec::new());
        }
        *slot = field.zero();
    }
    match slot {
        Some(BoundNode::Container(c)) => write_container(ctx, node.id, c, rest, trail, mode, None),
        _ => unmatched(ctx, trail, &rest[0]),
    }
}

#[allow(clippy::too_many_arguments)]
fn write_list(
    ctx: &Ctx<'_>,
    node: &SchemaNode,
    field: &FieldDescriptor,
    slot: &mut Option<BoundNode>,
    keys: &BTreeMap<String, String>,
    rest: &[PathElem],
    trail: &Trail,
    mode: Mode<'_>,
) -> EngineResult<Vec<Resolved>> {
    let at = trail.at(None);
    let FieldShape::List { entry: entry_ty, .. } = &field.shape else {
        return Err(EngineError::schema_mismatch(at, "field is not a list"));
    };
    if node.is_unkeyed_list() {
        if !keys.is_empty() || !rest.is_empty() {
            return Err(EngineError::schema_mismatch(
                at,
                "entries of an unkeyed list cannot be addressed, replace the whole list",
            ));
        }
        return terminal(ctx, node, field, slot, trail, mode, None);
    }
    if keys.is_empty() && !ctx.opts.allow_partial_key_match {
        if rest.is_empty() {
            return terminal(ctx, node, field, slot, trail, mode, None);
        }
        return Err(EngineError::malformed(
            at,
            format!("list {} needs a key predicate", node.name),
        ));
    }

    let filter = KeyFilter::parse(ctx.schema, node, keys, ctx.opts, &at)?;
    if slot.is_none() {
        if mode.is_erase() {
            return Ok(Vec::new());
        }
        *slot = field.zero();
    }
    let entries = slot
        .as_mut()
        .and_then(BoundNode::as_entries_mut)
        .ok_or_else(|| EngineError::schema_mismatch(at.clone(), "data is not a list"))?;

    let mut matched: Vec<ListKey> = entries.keys().into_iter().filter(|k| filter.matches(k)).collect();
    if matched.is_empty() {
        if mode.is_erase() {
            return Ok(Vec::new());
        }
        let key = filter.full_key().ok_or_else(|| {
            EngineError::malformed(at.clone(), "creating an entry needs every key without wildcards")
        })?;
        let entry = new_entry(entry_ty, &node.keys, &key, &at)?;
        entries
            .insert_entry(key.clone(), entry)
            .map_err(|e| EngineError::schema_mismatch(at.clone(), e.to_string()))?;
        trace!(at = %trail.path, key = %key, "materialized list entry");
        matched.push(key);
    }

    let mut results = Vec::new();
    for key in matched {
        let next = trail.entry(node, &key);
        let guard = EntryGuard {
            key_names: &node.keys,
            key: key.clone(),
        };
        if rest.is_empty() && mode.is_erase() {
            entries.remove_entry(&key);
            results.push(resolved(node.id, &next, false, false));
            continue;
        }
        let entry = entries
            .get_entry_mut(&key)
            .ok_or_else(|| EngineError::not_found(next.at(None), "entry vanished"))?;
        if rest.is_empty() {
            if let Mode::Install(payload) = mode {
                install_container(ctx, node.id, entry, payload, &next, Some(&guard))?;
            }
            results.push(resolved(node.id, &next, true, false));
            continue;
        }
        results.extend(write_container(ctx, node.id, entry, rest, &next, mode, Some(&guard))?);
        if mode.is_erase() && entry.is_empty() {
            entries.remove_entry(&key);
        }
    }
    Ok(results)
}

fn terminal(
    ctx: &Ctx<'_>,
    node: &SchemaNode,
    field: &FieldDescriptor,
    slot: &mut Option<BoundNode>,
    trail: &Trail,
    mode: Mode<'_>,
    pinned: Option<&Value>,
) -> EngineResult<Vec<Resolved>> {
    let at = trail.at(None);
    match mode {
        Mode::Materialize => {
            if slot.is_none() {
                *slot = field.zero();
            }
        }
        Mode::Erase => {
            if pinned.is_some() {
                return Err(EngineError::unsettable(at, "list key leaves cannot be deleted"));
            }
            *slot = None;
        }
        Mode::Install(payload) => install_slot(ctx, node, field, slot, payload, &at, pinned)?,
    }
    let present = slot.as_ref().map_or(false, |n| !n.is_empty());
    Ok(vec![resolved(node.id, trail, present, pinned.is_some())])
}

fn install_container(
    ctx: &Ctx<'_>,
    id: SchemaId,
    container: &mut Container,
    payload: &Payload,
    trail: &Trail,
    guard: Option<&EntryGuard<'_>>,
) -> EngineResult<()> {
    let json = match payload {
        Payload::Structured(json) => json,
        Payload::Scalar(v) => {
            return Err(EngineError::type_mismatch(
                trail.at(None),
                format!("cannot install scalar {v} onto a container"),
            ))
        }
    };
    ctx.decoder
        .decode_container(ctx.schema, id, json, container, ctx.opts.decode_options())
        .map_err(|e| EngineError::from_decode(trail.at(None), e))?;
    if let Some(name) = guard.and_then(|g| g.changed(container)) {
        return Err(EngineError::unsettable(
            trail.at(None),
            format!("key leaf {name} cannot change"),
        ));
    }
    Ok(())
}

fn install_slot(
    ctx: &Ctx<'_>,
    node: &SchemaNode,
    field: &FieldDescriptor,
    slot: &mut Option<BoundNode>,
    payload: &Payload,
    at: &str,
    pinned: Option<&Value>,
) -> EngineResult<()> {
    let scalar_json = |json: &serde_json::Value| !json.is_object() && !json.is_array();
    match (node.kind, payload) {
        (SchemaKind::Leaf, Payload::Scalar(v)) => {
            let value = checked(ctx, node, v.clone(), at)?;
            write_leaf(slot, value, pinned, at)
        }
        (SchemaKind::Leaf, Payload::Structured(json)) if scalar_json(json) => {
            let value = from_json(node, json, at)?;
            write_leaf(slot, value, pinned, at)
        }
        (SchemaKind::Leaf, Payload::Structured(_)) => Err(EngineError::schema_mismatch(
            at,
            "cannot install a structured payload onto a leaf",
        )),
        (SchemaKind::LeafList, Payload::Scalar(Value::List(items))) => {
            let ty = leaf_type(node, at)?;
            let values = items
                .iter()
                .map(|v| ty.coerce(v.clone()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| EngineError::type_mismatch(at, e.to_string()))?;
            write_leaf_list(ctx, node, slot, values, at)
        }
        (SchemaKind::LeafList, Payload::Scalar(v)) => {
            let value = leaf_type(node, at)?
                .coerce(v.clone())
                .map_err(|e| EngineError::type_mismatch(at, e.to_string()))?;
            let mut values = current_items(slot);
            values.push(value);
            write_leaf_list(ctx, node, slot, values, at)
        }
        (SchemaKind::LeafList, Payload::Structured(json)) if scalar_json(json) => {
            let mut values = current_items(slot);
            values.push(from_json(node, json, at)?);
            *slot = Some(BoundNode::LeafList(values));
            Ok(())
        }
        (_, Payload::Structured(json)) => ctx
            .decoder
            .decode_field(ctx.schema, node.id, field, json, slot, ctx.opts.decode_options())
            .map_err(|e| EngineError::from_decode(at, e)),
        (kind, Payload::Scalar(v)) => Err(EngineError::type_mismatch(
            at,
            format!("cannot install scalar {v} onto a {kind:?}"),
        )),
    }
}

fn leaf_type<'n>(node: &'n SchemaNode, at: &str) -> EngineResult<&'n LeafType> {
    node.leaf_type
        .as_ref()
        .ok_or_else(|| EngineError::schema_mismatch(at, "node has no leaf type"))
}

/// Coerce a scalar to the leaf's kind, then check its restrictions.
pub(crate) fn checked(ctx: &Ctx<'_>, node: &SchemaNode, value: Value, at: &str) -> EngineResult<Value> {
    let value = leaf_type(node, at)?
        .coerce(value)
        .map_err(|e| EngineError::type_mismatch(at, e.to_string()))?;
    ctx.validator
        .validate_value(node, &value)
        .map_err(|e| EngineError::validation(at, e))?;
    Ok(value)
}

fn from_json(node: &SchemaNode, json: &serde_json::Value, at: &str) -> EngineResult<Value> {
    json_to_value(leaf_type(node, at)?, json).map_err(|m| EngineError::type_mismatch(at, m))
}

fn write_leaf(
    slot: &mut Option<BoundNode>,
    value: Value,
    pinned: Option<&Value>,
    at: &str,
) -> EngineResult<()> {
    if let Some(key) = pinned {
        if *key != value {
            return Err(EngineError::unsettable(
                at,
                format!("list key leaf holds {key}, cannot change to {value}"),
            ));
        }
    }
    *slot = Some(BoundNode::Leaf(value));
    Ok(())
}

fn current_items(slot: &Option<BoundNode>) -> Vec<Value> {
    slot.as_ref()
        .and_then(BoundNode::as_leaf_list)
        .map(<[Value]>::to_vec)
        .unwrap_or_default()
}

fn write_leaf_list(
    ctx: &Ctx<'_>,
    node: &SchemaNode,
    slot: &mut Option<BoundNode>,
    values: Vec<Value>,
    at: &str,
) -> EngineResult<()> {
    let list = Value::List(values);
    ctx.validator
        .validate_value(node, &list)
        .map_err(|e| EngineError::validation(at, e))?;
    if let Value::List(values) = list {
        *slot = Some(BoundNode::LeafList(values));
    }
    Ok(())
}
