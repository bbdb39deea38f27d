//! Path traversal.
//!
//! - `read` - immutable traversal returning borrowed results
//! - `write` - mutating traversal: materialize, install and erase
//! - `fields` - matching path prefixes against field bindings
//! - `keys` - typed key predicates and key-leaf protection

mod fields;
mod keys;
mod read;
mod write;

pub(crate) use read::read;
pub(crate) use write::{checked, write, Mode};

use crate::error::{EngineError, EngineResult};
use crate::options::ResolveOptions;
use crate::result::{Location, Step};
use tracing::trace;
use ytree_core::{Path, PathElem};
use ytree_schema::{Schema, SchemaId, SchemaNode};
use ytree_tree::{ListKey, Unmarshal};
use ytree_validate::Validator;

/// Everything a traversal reads but never changes.
pub(crate) struct Ctx<'e> {
    pub schema: &'e Schema,
    pub validator: &'e Validator,
    pub decoder: &'e dyn Unmarshal,
    pub opts: &'e ResolveOptions,
}

/// Canonical path and physical location accumulated while descending.
#[derive(Debug, Clone, Default)]
pub(crate) struct Trail {
    pub path: Path,
    pub location: Location,
}

impl Trail {
    /// Descend into field `index` through schema path `names`.
    pub fn field(&self, index: usize, names: &[String]) -> Trail {
        let mut next = self.clone();
        for name in names {
            next.path.push(PathElem::new(name.as_str()));
        }
        next.location.push(Step::Field(index));
        next
    }

    /// Select entry `key` of the list this trail ends at.
    pub fn entry(&self, list: &SchemaNode, key: &ListKey) -> Trail {
        let mut elems = self.path.elems().to_vec();
        if let Some(last) = elems.last_mut() {
            for (name, value) in list.keys.iter().zip(key.values()) {
                last.keys.insert(name.clone(), value.to_key_string());
            }
        }
        let mut location = self.location.clone();
        location.push(Step::Entry(key.clone()));
        Trail {
            path: Path::new(elems),
            location,
        }
    }

    /// Canonical path so far, with `next` appended when given.
    pub fn at(&self, next: Option<&PathElem>) -> String {
        match next {
            Some(elem) => self.path.child(elem.clone()).canonical(),
            None => self.path.canonical(),
        }
    }
}

/// A path element no field binds to: skipped under `ignore_extra_fields`.
pub(crate) fn unmatched<T>(ctx: &Ctx<'_>, trail: &Trail, elem: &PathElem) -> EngineResult<Vec<T>> {
    if ctx.opts.ignore_extra_fields {
        trace!(at = %trail.path, name = %elem.name, "ignoring unknown path element");
        return Ok(Vec::new());
    }
    Err(EngineError::not_found(
        trail.at(Some(elem)),
        format!("no field matches {}", elem.name),
    ))
}

pub(crate) fn schema_node<'e>(
    ctx: &Ctx<'e>,
    id: SchemaId,
    trail: &Trail,
) -> EngineResult<&'e SchemaNode> {
    ctx.schema
        .get(id)
        .ok_or_else(|| EngineError::schema_mismatch(trail.at(None), format!("unknown schema node {id}")))
}

pub(crate) fn descend(ctx: &Ctx<'_>, id: SchemaId, names: &[String], trail: &Trail) -> EngineResult<SchemaId> {
    ctx.schema.descend(id, names).ok_or_else(|| {
        EngineError::schema_mismatch(
            trail.at(None),
            format!("no schema node at {}", names.join("/")),
        )
    })
}
