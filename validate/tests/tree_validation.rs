//! Whole-schema and whole-tree validation passes.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use ytree_core::Value;
use ytree_schema::{Kind, LeafType, Schema, SchemaBuilder};
use ytree_tree::{BoundNode, Container, EntryMap, KeyedList, ListKey, RecordType};
use ytree_validate::{ValidationError, Validator};

struct Fixture {
    schema: Schema,
    root_ty: Arc<RecordType>,
    user_ty: Arc<RecordType>,
}

fn fixture() -> Fixture {
    let mut b = SchemaBuilder::new("device");
    let root = b.root();
    let system = b.add_container(root, "system").done().unwrap();
    b.add_leaf(
        system,
        "hostname",
        LeafType::string().with_length(Some(1), Some(8)),
    )
    .done()
    .unwrap();
    b.add_leaf_list(system, "tags", LeafType::string()).done().unwrap();
    let user = b.add_list(system, "user").key("name").done().unwrap();
    b.add_leaf(user, "name", LeafType::string().with_pattern("^[a-z]+$"))
        .done()
        .unwrap();
    b.add_leaf(
        user,
        "uid",
        LeafType::new(Kind::Uint32).with_range(Some(1000), None),
    )
    .done()
    .unwrap();
    let schema = b.build();

    let user_ty = RecordType::builder("User")
        .leaf("name", "name")
        .leaf("uid", "uid")
        .build();
    let system_ty = RecordType::builder("System")
        .leaf("hostname", "hostname")
        .leaf_list("tags", "tags")
        .list("user", "user", user_ty.clone())
        .build();
    let root_ty = RecordType::builder("Device")
        .container("system", "system", system_ty)
        .build();
    Fixture {
        schema,
        root_ty,
        user_ty,
    }
}

fn user(ty: &Arc<RecordType>, name: &str, uid: u64) -> Container {
    let mut c = Container::new(ty.clone());
    c.set_leaf("name", name).unwrap();
    c.set_leaf("uid", Value::Uint(uid)).unwrap();
    c
}

// ========== TEST: validate_tree_collects_every_violation ==========
#[test]
fn test_validate_tree_collects_every_violation() {
    // GIVEN a tree with a too-long hostname, a duplicate tag and a bad user
    let f = fixture();
    let system_ty = match &f.root_ty.fields()[0].shape {
        ytree_tree::FieldShape::Container(ty) => ty.clone(),
        _ => unreachable!(),
    };
    let mut system = Container::new(system_ty);
    system.set_leaf("hostname", "much-too-long").unwrap();
    system
        .set(
            "tags",
            BoundNode::LeafList(vec![Value::from("a"), Value::from("a")]),
        )
        .unwrap();
    let mut users = KeyedList::new();
    users
        .insert_entry(ListKey::single("alice"), user(&f.user_ty, "alice", 1001))
        .unwrap();
    users
        .insert_entry(ListKey::single("bob"), user(&f.user_ty, "bob", 7))
        .unwrap();
    system.set("user", BoundNode::List(users)).unwrap();
    let mut root = Container::new(f.root_ty.clone());
    root.set("system", BoundNode::Container(system)).unwrap();

    // WHEN the tree is validated
    let violations = Validator::new().validate_tree(&f.schema, f.schema.root(), &root);

    // THEN each broken restriction is reported with its path
    let paths: Vec<&str> = violations.all().iter().map(|v| v.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/system/hostname",
            "/system/tags",
            "/system/user[name=bob]/uid"
        ]
    );
}

// ========== TEST: validate_tree_clean ==========
#[test]
fn test_validate_tree_clean() {
    let f = fixture();
    let root = Container::new(f.root_ty.clone());
    assert!(Validator::new()
        .validate_tree(&f.schema, f.schema.root(), &root)
        .is_empty());
}

// ========== TEST: validate_schema_reports_bad_nodes ==========
#[test]
fn test_validate_schema_reports_bad_nodes() {
    // GIVEN a schema with an unkeyed config list and an unparsable pattern
    let mut b = SchemaBuilder::new("device");
    let root = b.root();
    let l = b.add_list(root, "entries").done().unwrap();
    b.add_leaf(l, "x", LeafType::string().with_pattern("(")).done().unwrap();
    let schema = b.build();

    // WHEN validated
    let violations = Validator::new().validate_schema(&schema);

    // THEN both are reported
    let paths: Vec<&str> = violations.all().iter().map(|v| v.path.as_str()).collect();
    assert_eq!(paths, vec!["/entries", "/entries/x"]);
}

#[test]
fn test_union_accepts_any_member() {
    let validator = Validator::new();
    let ty = LeafType::union(vec![
        LeafType::new(Kind::Uint8).with_range(Some(1), Some(10)),
        LeafType::string().with_pattern("^auto$"),
    ]);
    assert!(validator.validate_kind_value(&ty, &Value::Uint(5)).is_ok());
    assert!(validator.validate_kind_value(&ty, &Value::from("auto")).is_ok());
    assert!(validator.validate_kind_value(&ty, &Value::from("manual")).is_err());
}

#[test]
fn test_kind_mismatch() {
    let validator = Validator::new();
    let err = validator
        .validate_kind_value(&LeafType::string(), &Value::Int(3))
        .unwrap_err();
    assert!(matches!(err, ValidationError::Kind { .. }));
}
