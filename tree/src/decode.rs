//! Structured payload decoding.
//!
//! `Unmarshal` is the seam through which structured payloads are merged
//! into bound data. `JsonDecoder` is the default implementation for
//! RFC 7951 style JSON: members are matched against each field's primary
//! schema paths, so compressed and uncompressed layouts both decode.
//! Decoding merges into existing data and performs no restriction checks.

use crate::error::{DecodeError, DecodeResult};
use crate::node::{BoundNode, Container, EntryMap, ListKey};
use crate::record::{FieldDescriptor, FieldShape, RecordType};
use serde_json::{Map, Value as Json};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;
use ytree_core::{Decimal64, Value};
use ytree_schema::{Kind, LeafType, Schema, SchemaId, SchemaNode};

/// Decoding switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Skip members that match no field instead of failing.
    pub ignore_extra_fields: bool,
}

/// Decoder of structured payloads into bound data.
pub trait Unmarshal: Send + Sync {
    /// Merge `json` into the container bound to schema node `id`.
    fn decode_container(
        &self,
        schema: &Schema,
        id: SchemaId,
        json: &Json,
        target: &mut Container,
        opts: DecodeOptions,
    ) -> DecodeResult<()>;

    /// Merge `json` into the slot of `field`, bound to schema node `id`.
    fn decode_field(
        &self,
        schema: &Schema,
        id: SchemaId,
        field: &FieldDescriptor,
        json: &Json,
        slot: &mut Option<BoundNode>,
        opts: DecodeOptions,
    ) -> DecodeResult<()>;
}

/// Default JSON decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl JsonDecoder {
    pub fn new() -> Self {
        Self
    }

    fn decode_entry(
        &self,
        schema: &Schema,
        id: SchemaId,
        entry_ty: &Arc<RecordType>,
        item: &Json,
        list: &mut dyn EntryMap,
        opts: DecodeOptions,
    ) -> DecodeResult<()> {
        let node = schema_node(schema, id)?;
        let key = if node.keys.is_empty() {
            ListKey::single(Value::Uint(list.len() as u64))
        } else {
            entry_key(schema, node, entry_ty, item)?
        };

        if list.get_entry(&key).is_none() {
            list.insert_entry(key.clone(), Container::new(entry_ty.clone()))?;
        }
        let target = list
            .get_entry_mut(&key)
            .ok_or_else(|| DecodeError::schema(display_path(schema, id), "entry vanished"))?;
        self.decode_container(schema, id, item, target, opts)
    }
}

impl Unmarshal for JsonDecoder {
    fn decode_container(
        &self,
        schema: &Schema,
        id: SchemaId,
        json: &Json,
        target: &mut Container,
        opts: DecodeOptions,
    ) -> DecodeResult<()> {
        let obj = json.as_object().ok_or_else(|| {
            DecodeError::type_error(
                display_path(schema, id),
                format!("expected object, got {}", json_kind(json)),
            )
        })?;
        trace!(path = %display_path(schema, id), members = obj.len(), "decoding container");

        let mut consumed: HashSet<&str> = HashSet::new();
        for (field, slot) in target.fields_mut() {
            if field.is_annotation() {
                let name = format!("@{}", field.name);
                if let Some((member_name, value)) = obj.get_key_value(&name) {
                    consumed.insert(member_name.as_str());
                    *slot = Some(BoundNode::Annotation(value.clone()));
                }
                continue;
            }
            for shadow in &field.shadow_paths {
                if let Some((member_name, _)) = lookup(json, shadow) {
                    consumed.insert(member_name);
                }
            }
            let found = field
                .paths
                .iter()
                .find_map(|p| lookup(json, p).map(|(m, v)| (p, m, v)));
            let Some((path, member_name, value)) = found else {
                continue;
            };
            consumed.insert(member_name);

            let child = schema.descend(id, path).ok_or_else(|| {
                DecodeError::schema(
                    display_path(schema, id),
                    format!("field {} binds to unknown path {}", field.name, path.join("/")),
                )
            })?;
            self.decode_field(schema, child, field, value, slot, opts)?;
        }

        if !opts.ignore_extra_fields {
            let extra = obj
                .keys()
                .find(|k| !k.starts_with('@') && !consumed.contains(k.as_str()));
            if let Some(member) = extra {
                return Err(DecodeError::UnknownField {
                    path: display_path(schema, id),
                    member: member.clone(),
                });
            }
        }
        Ok(())
    }

    fn decode_field(
        &self,
        schema: &Schema,
        id: SchemaId,
        field: &FieldDescriptor,
        json: &Json,
        slot: &mut Option<BoundNode>,
        opts: DecodeOptions,
    ) -> DecodeResult<()> {
        let node = schema_node(schema, id)?;
        match &field.shape {
            FieldShape::Leaf => {
                let value = json_to_value(leaf_type(schema, node)?, json)
                    .map_err(|m| DecodeError::type_error(display_path(schema, id), m))?;
                *slot = Some(BoundNode::Leaf(value));
            }
            FieldShape::LeafList => {
                let items = json.as_array().ok_or_else(|| {
                    DecodeError::type_error(display_path(schema, id), "expected array")
                })?;
                let ty = leaf_type(schema, node)?;
                let values = items
                    .iter()
                    .map(|item| json_to_value(ty, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|m| DecodeError::type_error(display_path(schema, id), m))?;
                *slot = Some(BoundNode::LeafList(values));
            }
            FieldShape::Container(ty) => {
                let bound =
                    slot.get_or_insert_with(|| BoundNode::Container(Container::new(ty.clone())));
                let container = bound.as_container_mut().ok_or_else(|| {
                    DecodeError::type_error(display_path(schema, id), "slot is not a container")
                })?;
                self.decode_container(schema, id, json, container, opts)?;
            }
            FieldShape::List { entry, .. } => {
                let items = json.as_array().ok_or_else(|| {
                    DecodeError::type_error(display_path(schema, id), "expected array")
                })?;
                if slot.is_none() {
                    *slot = field.zero();
                }
                let list = slot
                    .as_mut()
                    .and_then(BoundNode::as_entries_mut)
                    .ok_or_else(|| {
                        DecodeError::type_error(display_path(schema, id), "slot is not a list")
                    })?;
                for item in items {
                    self.decode_entry(schema, id, entry, item, list, opts)?;
                }
            }
            FieldShape::Annotation => {
                *slot = Some(BoundNode::Annotation(json.clone()));
            }
        }
        Ok(())
    }
}

/// Convert a JSON scalar into a value of the given leaf type.
pub fn json_to_value(ty: &LeafType, json: &Json) -> Result<Value, String> {
    let converted = match json {
        Json::String(s) => match ty.kind {
            Kind::String | Kind::Bits => Ok(Value::String(s.clone())),
            _ => ty.parse_key(s),
        },
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                ty.coerce(Value::Int(i))
            } else if let Some(u) = n.as_u64() {
                ty.coerce(Value::Uint(u))
            } else if ty.kind == Kind::Decimal64 {
                Decimal64::parse_with_scale(&n.to_string(), ty.fraction_digits).map(Value::Decimal)
            } else {
                return Err(format!("{} is not a valid {}", n, ty.kind));
            }
        }
        Json::Bool(b) => ty.coerce(Value::Bool(*b)),
        Json::Array(items) if items.len() == 1 && items[0].is_null() => ty.coerce(Value::Empty),
        other => return Err(format!("unexpected {} for {}", json_kind(other), ty.kind)),
    };
    converted.map_err(|e| e.to_string())
}

fn entry_key(
    schema: &Schema,
    list: &SchemaNode,
    entry_ty: &RecordType,
    item: &Json,
) -> DecodeResult<ListKey> {
    let obj = item.as_object().ok_or_else(|| {
        DecodeError::type_error(display_path(schema, list.id), "list entry is not an object")
    })?;
    let mut values = Vec::with_capacity(list.keys.len());
    for key in &list.keys {
        let missing = || DecodeError::MissingKey {
            path: display_path(schema, list.id),
            key: key.clone(),
        };
        let leaf = schema
            .key_leaf(list.id, key)
            .ok_or_else(|| DecodeError::schema(display_path(schema, list.id), format!("no key leaf {key}")))?;
        let raw = member(obj, key)
            .map(|(_, v)| v)
            .or_else(|| {
                let idx = entry_ty.key_field_index(key)?;
                entry_ty.fields()[idx]
                    .paths
                    .iter()
                    .find_map(|p| lookup(item, p).map(|(_, v)| v))
            })
            .ok_or_else(missing)?;
        let value = json_to_value(leaf_type(schema, leaf)?, raw)
            .map_err(|m| DecodeError::type_error(display_path(schema, list.id), m))?;
        values.push(value);
    }
    Ok(ListKey::new(values))
}

/// Find a member by local name, accepting module-qualified member names.
fn member<'a>(obj: &'a Map<String, Json>, name: &str) -> Option<(&'a String, &'a Json)> {
    obj.iter().find(|(k, _)| {
        k.as_str() == name || k.split_once(':').map_or(false, |(_, local)| local == name)
    })
}

/// Follow `path` through nested objects. Returns the top-level member name
/// and the value found.
fn lookup<'a>(json: &'a Json, path: &[String]) -> Option<(&'a str, &'a Json)> {
    let mut current = json;
    let mut first = None;
    for segment in path {
        let (name, value) = member(current.as_object()?, segment)?;
        first.get_or_insert(name.as_str());
        current = value;
    }
    Some((first?, current))
}

fn schema_node(schema: &Schema, id: SchemaId) -> DecodeResult<&SchemaNode> {
    schema
        .get(id)
        .ok_or_else(|| DecodeError::schema(id.to_string(), "unknown schema node"))
}

fn leaf_type<'a>(schema: &Schema, node: &'a SchemaNode) -> DecodeResult<&'a LeafType> {
    node.leaf_type
        .as_ref()
        .ok_or_else(|| DecodeError::schema(display_path(schema, node.id), "node has no leaf type"))
}

fn display_path(schema: &Schema, id: SchemaId) -> String {
    schema.path_of(id).join("/")
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use ytree_schema::SchemaBuilder;

    fn fixture() -> (Schema, Arc<RecordType>) {
        let mut b = SchemaBuilder::new("device");
        let root = b.root();
        let system = b.add_container(root, "system").done().unwrap();
        b.add_leaf(system, "hostname", LeafType::string()).done().unwrap();
        let server = b.add_list(system, "server").key("address").done().unwrap();
        b.add_leaf(server, "address", LeafType::string()).done().unwrap();
        let config = b.add_container(server, "config").done().unwrap();
        b.add_leaf(config, "address", LeafType::string()).done().unwrap();
        b.add_leaf(config, "port", LeafType::new(Kind::Uint16)).done().unwrap();
        b.add_leaf_list(system, "dns", LeafType::string()).done().unwrap();
        let schema = b.build();

        let server_ty = RecordType::builder("Server")
            .leaf("address", "address|config/address")
            .leaf("port", "config/port")
            .build();
        let system_ty = RecordType::builder("System")
            .leaf("hostname", "hostname")
            .list("server", "server", server_ty)
            .leaf_list("dns", "dns")
            .build();
        let root_ty = RecordType::builder("Device")
            .container("system", "system", system_ty)
            .build();
        (schema, root_ty)
    }

    // ========== TEST: decode_nested_payload ==========
    #[test]
    fn test_decode_nested_payload() {
        // GIVEN a payload with a container, a keyed list and a leaf-list
        let (schema, root_ty) = fixture();
        let mut root = Container::new(root_ty);
        let payload = json!({
            "system": {
                "hostname": "r1",
                "server": [{"address": "10.0.0.1", "config": {"port": 53}}],
                "dns": ["a", "b"]
            }
        });

        // WHEN decoded
        JsonDecoder
            .decode_container(&schema, schema.root(), &payload, &mut root, DecodeOptions::default())
            .unwrap();

        // THEN every member lands on its field
        let system = root.field("system").and_then(BoundNode::as_container).unwrap();
        assert_eq!(system.leaf("hostname"), Some(&Value::from("r1")));
        let servers = system.field("server").and_then(BoundNode::as_entries).unwrap();
        let entry = servers.get_entry(&ListKey::single("10.0.0.1")).unwrap();
        assert_eq!(entry.leaf("port"), Some(&Value::Uint(53)));
        assert_eq!(
            system.field("dns").and_then(BoundNode::as_leaf_list),
            Some(&[Value::from("a"), Value::from("b")][..])
        );
    }

    // ========== TEST: decode_merges_into_existing ==========
    #[test]
    fn test_decode_merges_into_existing() {
        let (schema, root_ty) = fixture();
        let mut root = Container::new(root_ty);
        let first = json!({"system": {"hostname": "r1"}});
        let second = json!({"system": {"server": [{"address": "x"}]}});
        let opts = DecodeOptions::default();
        JsonDecoder.decode_container(&schema, schema.root(), &first, &mut root, opts).unwrap();
        JsonDecoder.decode_container(&schema, schema.root(), &second, &mut root, opts).unwrap();

        let system = root.field("system").and_then(BoundNode::as_container).unwrap();
        assert_eq!(system.leaf("hostname"), Some(&Value::from("r1")));
        assert_eq!(system.field("server").and_then(BoundNode::as_entries).unwrap().len(), 1);
    }

    // ========== TEST: unknown_member_rejected_unless_ignored ==========
    #[test]
    fn test_unknown_member_rejected_unless_ignored() {
        // GIVEN a payload with a member no field binds to
        let (schema, root_ty) = fixture();
        let payload = json!({"system": {"hostname": "r1", "bogus": 1}});

        // WHEN decoded strictly
        let mut root = Container::new(root_ty.clone());
        let strict = JsonDecoder.decode_container(
            &schema,
            schema.root(),
            &payload,
            &mut root,
            DecodeOptions::default(),
        );

        // THEN the member is reported
        assert!(matches!(strict, Err(DecodeError::UnknownField { member, .. }) if member == "bogus"));

        // AND tolerated when extras are ignored
        let mut root = Container::new(root_ty);
        let lenient = DecodeOptions {
            ignore_extra_fields: true,
        };
        JsonDecoder
            .decode_container(&schema, schema.root(), &payload, &mut root, lenient)
            .unwrap();
    }

    // ========== TEST: module_qualified_members ==========
    #[test]
    fn test_module_qualified_members() {
        let (schema, root_ty) = fixture();
        let mut root = Container::new(root_ty);
        let payload = json!({"acme-system:system": {"hostname": "r2"}});
        JsonDecoder
            .decode_container(&schema, schema.root(), &payload, &mut root, DecodeOptions::default())
            .unwrap();
        let system = root.field("system").and_then(BoundNode::as_container).unwrap();
        assert_eq!(system.leaf("hostname"), Some(&Value::from("r2")));
    }

    #[test]
    fn test_type_errors_reported() {
        let (schema, root_ty) = fixture();
        let mut root = Container::new(root_ty);
        let payload = json!({"system": {"server": [{"address": "x", "config": {"port": 70000}}]}});
        let err = JsonDecoder
            .decode_container(&schema, schema.root(), &payload, &mut root, DecodeOptions::default())
            .unwrap_err();
        assert!(matches!(err, DecodeError::Type { .. }));
    }

    #[test]
    fn test_missing_key_reported() {
        let (schema, root_ty) = fixture();
        let mut root = Container::new(root_ty);
        let payload = json!({"system": {"server": [{"config": {"port": 1}}]}});
        let err = JsonDecoder
            .decode_container(&schema, schema.root(), &payload, &mut root, DecodeOptions::default())
            .unwrap_err();
        assert!(matches!(err, DecodeError::MissingKey { key, .. } if key == "address"));
    }

    #[test]
    fn test_json_to_value_scalars() {
        assert_eq!(
            json_to_value(&LeafType::new(Kind::Int64), &json!("-5")).unwrap(),
            Value::Int(-5)
        );
        assert_eq!(
            json_to_value(&LeafType::decimal64(2), &json!(1.25)).unwrap(),
            Value::Decimal(Decimal64::new(125, 2))
        );
        assert_eq!(
            json_to_value(&LeafType::new(Kind::Empty), &json!([null])).unwrap(),
            Value::Empty
        );
        assert!(json_to_value(&LeafType::new(Kind::Bool), &json!("yes")).is_err());
    }
}
