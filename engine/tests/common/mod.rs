//! Shared fixture: a small device model in compressed form.
//!
//! Schema (uncompressed):
//!
//! ```text
//! /system/{hostname, dns*, clock/timezone}
//! /list[key1]/{key1, value}
//! /interfaces/interface[name]/{name, config/{name, mtu, enabled}, state/{name, mtu}}
//! /routes/route[prefix metric]/{prefix, metric, nexthop}     (ordered-by user)
//! /log/{msg}                                                  (unkeyed, state)
//! ```
//!
//! Records bind `interfaces/interface` and `routes/route` directly, and the
//! interface leaves bind to `config/*` with `state/*` as shadow paths.

#![allow(dead_code)]

use std::sync::{Arc, Once};
use ytree_core::Path;
use ytree_schema::{Kind, LeafType, Schema, SchemaBuilder};
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

pub fn schema() -> Arc<Schema> {
    let mut b = SchemaBuilder::new("device");
    let root = b.root();

    let system = b.add_container(root, "system").done().unwrap();
    b.add_leaf(system, "hostname", LeafType::string().with_length(Some(1), Some(16)))
        .done()
        .unwrap();
    b.add_leaf_list(system, "dns", LeafType::string()).done().unwrap();
    let clock = b.add_container(system, "clock").done().unwrap();
    b.add_leaf(clock, "timezone", LeafType::string()).done().unwrap();

    let list = b.add_list(root, "list").key("key1").done().unwrap();
    b.add_leaf(list, "key1", LeafType::string()).done().unwrap();
    b.add_leaf(list, "value", LeafType::string()).done().unwrap();

    let interfaces = b.add_container(root, "interfaces").done().unwrap();
    let interface = b.add_list(interfaces, "interface").key("name").done().unwrap();
    b.add_leaf(interface, "name", LeafType::string()).done().unwrap();
    let config = b.add_container(interface, "config").done().unwrap();
    b.add_leaf(config, "name", LeafType::string()).done().unwrap();
    b.add_leaf(
        config,
        "mtu",
        LeafType::new(Kind::Uint16).with_range(Some(64), Some(9216)),
    )
    .done()
    .unwrap();
    b.add_leaf(config, "enabled", LeafType::new(Kind::Bool)).done().unwrap();
    let state = b.add_container(interface, "state").state().done().unwrap();
    b.add_leaf(state, "name", LeafType::string()).done().unwrap();
    b.add_leaf(state, "mtu", LeafType::new(Kind::Uint16)).done().unwrap();

    let routes = b.add_container(root, "routes").done().unwrap();
    let route = b
        .add_list(routes, "route")
        .key("prefix")
        .key("metric")
        .ordered_by_user()
        .done()
        .unwrap();
    b.add_leaf(route, "prefix", LeafType::string()).done().unwrap();
    b.add_leaf(route, "metric", LeafType::new(Kind::Uint32)).done().unwrap();
    b.add_leaf(route, "nexthop", LeafType::string()).done().unwrap();

    let log = b.add_list(root, "log").state().done().unwrap();
    b.add_leaf(log, "msg", LeafType::string()).done().unwrap();

    Arc::new(b.build())
}

pub fn device() -> Arc<RecordType> {
    let clock = RecordType::builder("Clock").leaf("timezone", "timezone").build();
    let system = RecordType::builder("System")
        .leaf("hostname", "hostname")
        .leaf_list("dns", "dns")
        .container("clock", "clock", clock)
        .build();
    let entry = RecordType::builder("Entry")
        .leaf("key1", "key1")
        .leaf("value", "value")
        .build();
    let interface = RecordType::builder("Interface")
        .leaf("name", "name|config/name")
        .shadow("state/name")
        .leaf("mtu", "config/mtu")
        .shadow("state/mtu")
        .leaf("enabled", "config/enabled")
        .annotation("meta")
        .build();
    let route = RecordType::builder("Route")
        .leaf("prefix", "prefix")
        .leaf("metric", "metric")
        .leaf("nexthop", "nexthop")
        .build();
    let log = RecordType::builder("Log").leaf("msg", "msg").build();
    RecordType::builder("Device")
        .container("system", "system", system)
        .list("list", "list", entry)
        .list("interface", "interfaces/interface", interface)
        .ordered_list("route", "routes/route", route)
        .list("log", "log", log)
        .build()
}

pub fn tree() -> DataTree {
    DataTree::new(device())
}

pub fn p(s: &str) -> Path {
    Path::parse(s).unwrap()
}
