//! Matching path elements against a record's field bindings.

use crate::options::ResolveOptions;
use ytree_core::PathElem;
use ytree_tree::{FieldDescriptor, FieldShape, RecordType, SchemaPath};
use ytree_schema::SchemaNode;

/// The field a path prefix selected.
#[derive(Debug)]
pub(crate) struct FieldMatch<'t> {
    /// Field index within the record.
    pub index: usize,
    /// The candidate schema path that matched.
    pub schema_path: &'t SchemaPath,
    /// Matched through a non-authoritative candidate. Such matches are
    /// only accepted when they consume the rest of the path.
    pub alternate: bool,
}

/// Find the field whose candidate schema path is a prefix of `path`.
///
/// Authoritative candidates (primary paths, or shadow paths under
/// `prefer_shadow`) of every field are tried before any alternate, in
/// field declaration order. `reverse_shadow` swaps the two passes.
pub(crate) fn match_field<'t>(
    ty: &'t RecordType,
    path: &[PathElem],
    opts: &ResolveOptions,
) -> Option<FieldMatch<'t>> {
    let passes = if opts.reverse_shadow {
        [true, false]
    } else {
        [false, true]
    };
    for alternate in passes {
        for (index, field) in ty.fields().iter().enumerate() {
            if field.is_annotation() {
                continue;
            }
            let found = candidates(field, opts.prefer_shadow, alternate)
                .iter()
                .filter(|c| !alternate || c.len() == path.len())
                .find(|c| is_prefix(c, path));
            if let Some(schema_path) = found {
                return Some(FieldMatch {
                    index,
                    schema_path,
                    alternate,
                });
            }
        }
    }
    None
}

fn candidates(field: &FieldDescriptor, prefer_shadow: bool, alternate: bool) -> &[SchemaPath] {
    let shadow_first = prefer_shadow && !field.shadow_paths.is_empty();
    if shadow_first != alternate {
        &field.shadow_paths
    } else {
        &field.paths
    }
}

/// Element names must match; only the last matched element may carry keys.
fn is_prefix(candidate: &[String], path: &[PathElem]) -> bool {
    if candidate.is_empty() || candidate.len() > path.len() {
        return false;
    }
    let last = candidate.len() - 1;
    candidate
        .iter()
        .zip(path)
        .enumerate()
        .all(|(i, (name, elem))| name_matches(&elem.name, name) && (i == last || !elem.has_keys()))
}

/// Path names may be qualified with a module name.
pub(crate) fn name_matches(given: &str, schema_name: &str) -> bool {
    given == schema_name
        || given
            .split_once(':')
            .map_or(false, |(_, local)| local == schema_name)
}

/// Whether a field's shape agrees with the schema node it binds to.
pub(crate) fn shape_matches(shape: &FieldShape, node: &SchemaNode) -> bool {
    match shape {
        FieldShape::Leaf => node.is_leaf(),
        FieldShape::LeafList => node.is_leaf_list(),
        FieldShape::Container(_) => node.is_container(),
        FieldShape::List { .. } => node.is_list(),
        FieldShape::Annotation => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ytree_core::Path;

    fn iface() -> std::sync::Arc<RecordType> {
        RecordType::builder("Interface")
            .leaf("name", "name|config/name")
            .shadow("state/name")
            .leaf("mtu", "config/mtu")
            .shadow("state/mtu")
            .annotation("meta")
            .build()
    }

    fn elems(s: &str) -> Vec<PathElem> {
        Path::parse(s).unwrap().elems().to_vec()
    }

    // ========== TEST: primary_paths_in_declaration_order ==========
    #[test]
    fn test_primary_paths_in_declaration_order() {
        let ty = iface();
        let opts = ResolveOptions::default();
        let m = match_field(&ty, &elems("/config/mtu"), &opts).unwrap();
        assert_eq!(m.index, 1);
        assert!(!m.alternate);

        let m = match_field(&ty, &elems("/config/name"), &opts).unwrap();
        assert_eq!(m.index, 0);
        assert_eq!(m.schema_path, &vec!["config".to_string(), "name".into()]);
    }

    // ========== TEST: shadow_match_is_alternate ==========
    #[test]
    fn test_shadow_match_is_alternate() {
        // GIVEN a field with shadow paths
        let ty = iface();

        // WHEN addressed through its shadow path
        let m = match_field(&ty, &elems("/state/mtu"), &ResolveOptions::default()).unwrap();

        // THEN the match is flagged as alternate
        assert_eq!(m.index, 1);
        assert!(m.alternate);

        // AND prefer_shadow makes it authoritative
        let opts = ResolveOptions::new().with_prefer_shadow(true);
        let m = match_field(&ty, &elems("/state/mtu"), &opts).unwrap();
        assert!(!m.alternate);
        let m = match_field(&ty, &elems("/config/mtu"), &opts).unwrap();
        assert!(m.alternate);
    }

    #[test]
    fn test_alternate_must_be_exact() {
        let ty = iface();
        assert!(match_field(&ty, &elems("/state/mtu/extra"), &ResolveOptions::default()).is_none());
    }

    #[test]
    fn test_keys_only_on_last_element() {
        let ty = iface();
        let opts = ResolveOptions::default();
        assert!(match_field(&ty, &elems("/config[x=1]/mtu"), &opts).is_none());
        assert!(match_field(&ty, &elems("/nope"), &opts).is_none());
    }

    #[test]
    fn test_module_qualified_names() {
        assert!(name_matches("oc-if:interfaces", "interfaces"));
        assert!(name_matches("interfaces", "interfaces"));
        assert!(!name_matches("oc-if:interface", "interfaces"));
    }
}
