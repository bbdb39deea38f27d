//! Immutable traversal.

use super::fields::{match_field, shape_matches};
use super::keys::KeyFilter;
use super::{descend, schema_node, unmatched, Ctx, Trail};
use crate::error::{EngineError, EngineResult};
use crate::result::{DataRef, ResolvedNode};
use std::collections::BTreeMap;
use tracing::trace;
use ytree_core::PathElem;
use ytree_schema::{SchemaId, SchemaNode};
use ytree_tree::{BoundNode, Container};

/// Resolve `path` under `root` without changing anything.
pub(crate) fn read<'a>(
    ctx: &Ctx<'_>,
    id: SchemaId,
    root: &'a Container,
    path: &[PathElem],
) -> EngineResult<Vec<ResolvedNode<'a>>> {
    let trail = Trail::default();
    if path.is_empty() {
        return Ok(vec![found(id, Some(DataRef::Container(root)), &trail)]);
    }
    read_container(ctx, id, root, path, &trail)
}

fn found<'a>(schema: SchemaId, data: Option<DataRef<'a>>, trail: &Trail) -> ResolvedNode<'a> {
    ResolvedNode {
        schema,
        data,
        path: trail.path.clone(),
        location: trail.location.clone(),
    }
}

/// Data missing along the way: no results, or `PathNotFound`.
fn absent<T>(ctx: &Ctx<'_>, trail: &Trail, what: &str) -> EngineResult<Vec<T>> {
    if ctx.opts.tolerate_nil_intermediate {
        return Ok(Vec::new());
    }
    Err(EngineError::not_found(trail.at(None), what))
}

fn read_container<'a>(
    ctx: &Ctx<'_>,
    id: SchemaId,
    container: &'a Container,
    path: &[PathElem],
    trail: &Trail,
) -> EngineResult<Vec<ResolvedNode<'a>>> {
    let ty = container.record_type();
    trace!(at = %trail.path, record = ty.name(), "read container");
    let Some(m) = match_field(ty, path, ctx.opts) else {
        return unmatched(ctx, trail, &path[0]);
    };
    let child = descend(ctx, id, m.schema_path, trail)?;
    let next = trail.field(m.index, m.schema_path);
    if m.alternate {
        return Ok(vec![found(child, None, &next)]);
    }

    let node = schema_node(ctx, child, &next)?;
    let field = &ty.fields()[m.index];
    if !shape_matches(&field.shape, node) {
        return Err(EngineError::schema_mismatch(
            next.at(None),
            format!("field {} does not fit a {:?} node", field.name, node.kind),
        ));
    }
    let consumed = m.schema_path.len();
    let elem = &path[consumed - 1];
    let rest = &path[consumed..];
    let data = container.get(m.index);

    if node.is_list() {
        return read_list(ctx, node, data, &elem.keys, rest, &next);
    }
    if elem.has_keys() {
        return Err(EngineError::schema_mismatch(
            next.at(None),
            format!("{} is not a list", node.name),
        ));
    }
    if rest.is_empty() {
        return Ok(vec![found(child, data.map(DataRef::Node), &next)]);
    }
    match data {
        None => absent(ctx, &next, "unset intermediate node"),
        Some(BoundNode::Container(c)) => read_container(ctx, child, c, rest, &next),
        Some(_) => unmatched(ctx, &next, &rest[0]),
    }
}

fn read_list<'a>(
    ctx: &Ctx<'_>,
    node: &SchemaNode,
    data: Option<&'a BoundNode>,
    keys: &BTreeMap<String, String>,
    rest: &[PathElem],
    trail: &Trail,
) -> EngineResult<Vec<ResolvedNode<'a>>> {
    let whole = || vec![found(node.id, data.map(DataRef::Node), trail)];
    if node.is_unkeyed_list() {
        if !keys.is_empty() || !rest.is_empty() {
            return Err(EngineError::schema_mismatch(
                trail.at(None),
                "entries of an unkeyed list cannot be addressed",
            ));
        }
        return Ok(whole());
    }
    if keys.is_empty() && !ctx.opts.allow_partial_key_match {
        if rest.is_empty() {
            return Ok(whole());
        }
        return Err(EngineError::malformed(
            trail.at(None),
            format!("list {} needs a key predicate", node.name),
        ));
    }

    let filter = KeyFilter::parse(ctx.schema, node, keys, ctx.opts, &trail.at(None))?;
    let exact = filter.full_key().is_some();
    let Some(entries) = data.and_then(BoundNode::as_entries) else {
        return if exact {
            absent(ctx, trail, "list is unset")
        } else {
            Ok(Vec::new())
        };
    };

    let mut results = Vec::new();
    let mut matched = 0;
    for (key, entry) in entries.entries() {
        if !filter.matches(key) {
            continue;
        }
        matched += 1;
        let next = trail.entry(node, key);
        if rest.is_empty() {
            results.push(found(node.id, Some(DataRef::Container(entry)), &next));
        } else {
            results.extend(read_container(ctx, node.id, entry, rest, &next)?);
        }
    }
    trace!(at = %trail.path, matched, "read list");
    if matched == 0 && exact {
        return absent(ctx, trail, "no entry with that key");
    }
    Ok(results)
}
