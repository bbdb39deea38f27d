//! Batch apply over the shared two-level model.

mod common;

use common::{engine, leaf, p, seed, tree};
use pretty_assertions::assert_eq;
use serde_json::json;
use ytree_batch::{
    Applier, ApplyOptions, ApplyReport, BatchError, Notification, OpKind, SetRequest,
};
use ytree_core::{Path, Value};
use ytree_engine::{EngineError, ResolveOptions};
use ytree_tree::BoundNode;

// ========== TEST: deletes_then_replaces_then_updates ==========
#[test]
fn test_deletes_then_replaces_then_updates() {
    // GIVEN /a with unrelated data
    let e = engine();
    let mut t = tree();
    seed(&e, &mut t, "/a/note", "old");
    seed(&e, &mut t, "/a/b/d", "old-d");

    // WHEN a batch deletes /a, replaces /a/b and updates /a/b/c
    let req = SetRequest::new()
        .delete(p("/a"))
        .replace(p("/a/b"), json!({"c": "x", "d": "xd"}))
        .update(p("/a/b/c"), Value::from("y"));
    let report = Applier::new(&e, ApplyOptions::default())
        .apply(&mut t, &req)
        .unwrap();

    // THEN only the replaced subtree remains, with the update on top
    assert_eq!(
        report,
        ApplyReport {
            deletes: 1,
            replaces: 1,
            updates: 1
        }
    );
    assert_eq!(leaf(&e, &t, "/a/b/c"), Some(Value::from("y")));
    assert_eq!(leaf(&e, &t, "/a/b/d"), Some(Value::from("xd")));
    assert_eq!(leaf(&e, &t, "/a/note"), None);
    let a = t.root().field("a").and_then(BoundNode::as_container).unwrap();
    assert!(a.field("note").is_none());
}

// ========== TEST: replace_drops_previous_contents ==========
#[test]
fn test_replace_drops_previous_contents() {
    let e = engine();
    let mut t = tree();
    seed(&e, &mut t, "/a/b/d", "old-d");

    let req = SetRequest::new().replace(p("/a/b"), json!({"c": "new"}));
    Applier::new(&e, ApplyOptions::default()).apply(&mut t, &req).unwrap();

    assert_eq!(leaf(&e, &t, "/a/b/c"), Some(Value::from("new")));
    assert_eq!(leaf(&e, &t, "/a/b/d"), None);
}

// ========== TEST: paths_join_onto_prefix ==========
#[test]
fn test_paths_join_onto_prefix() {
    let e = engine();
    let mut t = tree();
    let req = SetRequest::new()
        .with_prefix(p("/a"))
        .update(p("b/c"), Value::from("p"))
        .update(p("note"), Value::from("n"));
    Applier::new(&e, ApplyOptions::default()).apply(&mut t, &req).unwrap();

    assert_eq!(leaf(&e, &t, "/a/b/c"), Some(Value::from("p")));
    assert_eq!(leaf(&e, &t, "/a/note"), Some(Value::from("n")));
}

// ========== TEST: malformed_join_reported ==========
#[test]
fn test_malformed_join_reported() {
    let e = engine();
    let mut t = tree();
    let req = SetRequest::new()
        .with_prefix(p("/a").with_origin("openconfig"))
        .update(p("note").with_origin("native"), Value::from("n"));
    let err = Applier::new(&e, ApplyOptions::default())
        .apply(&mut t, &req)
        .unwrap_err();
    assert!(matches!(
        err.engine_error(),
        Some(EngineError::MalformedPath { .. })
    ));
}

// ========== TEST: fail_fast_stops_at_first_error ==========
#[test]
fn test_fail_fast_stops_at_first_error() {
    // GIVEN a batch whose second update has the wrong type
    let e = engine();
    let mut t = tree();
    let req = SetRequest::new()
        .update(p("/a/b/c"), Value::from("ok"))
        .update(p("/a/b/count"), Value::from("many"))
        .update(p("/a/b/d"), Value::from("later"));

    // WHEN applied fail-fast
    let err = Applier::new(&e, ApplyOptions::default())
        .apply(&mut t, &req)
        .unwrap_err();

    // THEN that error is returned and later updates never ran
    match &err {
        BatchError::Operation { op, path, source } => {
            assert_eq!(*op, OpKind::Update);
            assert_eq!(path, "/a/b/count");
            assert!(matches!(source, EngineError::TypeMismatch { .. }), "{source}");
        }
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(leaf(&e, &t, "/a/b/c"), Some(Value::from("ok")));
    assert_eq!(leaf(&e, &t, "/a/b/d"), None);
}

// ========== TEST: best_effort_collects_every_failure ==========
#[test]
fn test_best_effort_collects_every_failure() {
    // GIVEN a batch with two bad updates among good ones
    let e = engine();
    let mut t = tree();
    let req = SetRequest::new()
        .update(p("/a/b/c"), Value::from("ok"))
        .update(p("/a/b/count"), Value::from("many"))
        .update(p("/a/bogus"), Value::from("z"))
        .update(p("/a/b/d"), Value::from("later"));

    // WHEN applied best-effort
    let err = Applier::new(&e, ApplyOptions::new().best_effort())
        .apply(&mut t, &req)
        .unwrap_err();

    // THEN both failures come back together and the rest is applied
    let kinds: Vec<_> = err
        .failures()
        .iter()
        .filter_map(|f| f.engine_error())
        .map(EngineError::kind)
        .collect();
    assert_eq!(kinds, vec!["TypeMismatch", "PathNotFound"]);
    assert_eq!(leaf(&e, &t, "/a/b/c"), Some(Value::from("ok")));
    assert_eq!(leaf(&e, &t, "/a/b/d"), Some(Value::from("later")));
}

// ========== TEST: ignore_extra_fields_under_best_effort ==========
#[test]
fn test_ignore_extra_fields_under_best_effort() {
    let e = engine();
    let mut t = tree();
    let req = SetRequest::new()
        .update(p("/a/bogus"), Value::from("z"))
        .update(p("/a/b/count"), Value::from("many"))
        .replace(p("/a/b"), json!({"c": "x", "colour": "red"}));
    let opts = ApplyOptions::new()
        .best_effort()
        .with_resolve(ResolveOptions::new().with_ignore_extra_fields(true));

    let err = Applier::new(&e, opts).apply(&mut t, &req).unwrap_err();

    // Unknown names are skipped; only the type error is reported.
    let failures = err.failures();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0].engine_error(),
        Some(EngineError::TypeMismatch { .. })
    ));
    assert_eq!(leaf(&e, &t, "/a/b/c"), Some(Value::from("x")));
}

// ========== TEST: validate_after_catches_structured_payloads ==========
#[test]
fn test_validate_after_catches_structured_payloads() {
    // GIVEN a structured replace that breaks a length restriction
    let e = engine();
    let req = SetRequest::new().replace(p("/a/b"), json!({"c": "far-too-long"}));

    // WHEN applied without the validation pass
    let mut t = tree();
    Applier::new(&e, ApplyOptions::default()).apply(&mut t, &req).unwrap();
    // THEN the value is installed as given
    assert_eq!(leaf(&e, &t, "/a/b/c"), Some(Value::from("far-too-long")));

    // WHEN applied with the validation pass
    let mut t = tree();
    let err = Applier::new(&e, ApplyOptions::new().with_validate_after(true))
        .apply(&mut t, &req)
        .unwrap_err();
    // THEN the violation names the offending leaf
    match err {
        BatchError::Validation(violations) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations.all()[0].path, "/a/b/c");
        }
        other => panic!("unexpected error {other}"),
    }
}

// ========== TEST: scalar_update_is_validated_immediately ==========
#[test]
fn test_scalar_update_is_validated_immediately() {
    let e = engine();
    let mut t = tree();
    let req = SetRequest::new().update(p("/a/b/c"), Value::from("far-too-long"));
    let err = Applier::new(&e, ApplyOptions::default())
        .apply(&mut t, &req)
        .unwrap_err();
    assert!(matches!(
        err.engine_error(),
        Some(EngineError::ValidationFailed { .. })
    ));
}

// ========== TEST: atomic_notification_replaces_prefix ==========
#[test]
fn test_atomic_notification_replaces_prefix() {
    // GIVEN two list entries
    let e = engine();
    let mut t = tree();
    seed(&e, &mut t, "/items[id=1]/val", "a");
    seed(&e, &mut t, "/items[id=2]/val", "b");
    seed(&e, &mut t, "/a/note", "keep");

    // WHEN an atomic notification rewrites one entry
    let n = Notification::new(p("/items[id=1]"))
        .atomic()
        .update(p("val"), Value::from("new"));
    let report = Applier::new(&e, ApplyOptions::default())
        .apply_notification(&mut t, &n)
        .unwrap();

    // THEN that entry is rebuilt and the rest is untouched
    assert_eq!(report.deletes, 1);
    assert_eq!(report.updates, 1);
    assert_eq!(leaf(&e, &t, "/items[id=1]/val"), Some(Value::from("new")));
    assert_eq!(leaf(&e, &t, "/items[id=2]/val"), Some(Value::from("b")));
    assert_eq!(leaf(&e, &t, "/a/note"), Some(Value::from("keep")));
}

// ========== TEST: non_atomic_notification_merges ==========
#[test]
fn test_non_atomic_notification_merges() {
    let e = engine();
    let mut t = tree();
    seed(&e, &mut t, "/a/b/d", "keep");
    seed(&e, &mut t, "/a/note", "gone");

    let n = Notification::new(p("/a"))
        .delete(p("note"))
        .update(p("b/c"), Value::from("c1"));
    Applier::new(&e, ApplyOptions::default())
        .apply_notification(&mut t, &n)
        .unwrap();

    assert_eq!(leaf(&e, &t, "/a/b/d"), Some(Value::from("keep")));
    assert_eq!(leaf(&e, &t, "/a/b/c"), Some(Value::from("c1")));
    assert_eq!(leaf(&e, &t, "/a/note"), None);
}

// ========== TEST: atomic_root_notification_resets_tree ==========
#[test]
fn test_atomic_root_notification_resets_tree() {
    let e = engine();
    let mut t = tree();
    seed(&e, &mut t, "/items[id=1]/val", "a");
    seed(&e, &mut t, "/a/b/d", "old");

    let notifications = vec![
        Notification::new(Path::root())
            .atomic()
            .update(p("/a/note"), Value::from("fresh")),
        Notification::new(p("/items[id=9]")).update(p("val"), Value::from("z")),
    ];
    let report = Applier::new(&e, ApplyOptions::default())
        .apply_notifications(&mut t, &notifications)
        .unwrap();

    assert_eq!(report.total(), 3);
    assert_eq!(leaf(&e, &t, "/a/note"), Some(Value::from("fresh")));
    assert_eq!(leaf(&e, &t, "/a/b/d"), None);
    assert_eq!(leaf(&e, &t, "/items[id=1]/val"), None);
    assert_eq!(leaf(&e, &t, "/items[id=9]/val"), Some(Value::from("z")));
    assert!(e.cache().get("/items[id=1]/val").is_none());
}
