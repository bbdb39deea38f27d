//! Shared fixture: a small two-level model.
//!
//! ```text
//! /a/{note, b/{c, d, count}}
//! /items[id]/{id, val}
//! ```

#![allow(dead_code)]

use std::sync::{Arc, Once};
use ytree_core::{Path, Value};
use ytree_engine::{Engine, Payload, ResolveOptions};
use ytree_schema::{Kind, LeafType, SchemaBuilder};
use ytree_tree::{DataTree, RecordType};

static INIT: Once = Once::new();

/// Initialize the tracing subscriber for tests.
/// Only initializes once, even if called multiple times.
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .with_target(false)
            .init();
    });
}

pub fn engine() -> Engine {
    init_tracing();
    let mut b = SchemaBuilder::new("model");
    let root = b.root();
    let a = b.add_container(root, "a").done().unwrap();
    b.add_leaf(a, "note", LeafType::string()).done().unwrap();
    let inner = b.add_container(a, "b").done().unwrap();
    b.add_leaf(inner, "c", LeafType::string().with_length(None, Some(8)))
        .done()
        .unwrap();
    b.add_leaf(inner, "d", LeafType::string()).done().unwrap();
    b.add_leaf(inner, "count", LeafType::new(Kind::Uint8)).done().unwrap();
    let items = b.add_list(root, "items").key("id").done().unwrap();
    b.add_leaf(items, "id", LeafType::string()).done().unwrap();
    b.add_leaf(items, "val", LeafType::string()).done().unwrap();
    Engine::new(Arc::new(b.build()))
}

pub fn tree() -> DataTree {
    let inner = RecordType::builder("B")
        .leaf("c", "c")
        .leaf("d", "d")
        .leaf("count", "count")
        .build();
    let a = RecordType::builder("A")
        .leaf("note", "note")
        .container("b", "b", inner)
        .build();
    let item = RecordType::builder("Item").leaf("id", "id").leaf("val", "val").build();
    let root = RecordType::builder("Model")
        .container("a", "a", a)
        .list("items", "items", item)
        .build();
    DataTree::new(root)
}

pub fn p(s: &str) -> Path {
    Path::parse(s).unwrap()
}

pub fn seed(e: &Engine, t: &mut DataTree, path: &str, v: &str) {
    e.set(t, &p(path), &Payload::from(Value::from(v)), &ResolveOptions::default())
        .unwrap();
}

pub fn leaf(e: &Engine, t: &DataTree, path: &str) -> Option<Value> {
    let opts = ResolveOptions::new().with_tolerate_nil_intermediate(true);
    e.get(t, &p(path), &opts)
        .unwrap()
        .first()
        .and_then(|n| n.leaf().cloned())
}
