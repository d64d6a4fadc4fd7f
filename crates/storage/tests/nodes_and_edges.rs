#![forbid(unsafe_code)]

use std::path::PathBuf;
use tc_core::graph::NodeStatus;
use tc_storage::{NewNode, SqliteStore, StoreError};

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("tc_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn add_get_and_duplicate_node() {
    let mut store = SqliteStore::open(temp_dir("add_get_and_duplicate_node")).expect("open store");

    let node = store
        .add_node(NewNode::new("root", "artifact", "app.done"))
        .expect("add node");
    assert_eq!(node.status, NodeStatus::Pending);
    assert!(node.created_at_ms > 0);

    let fetched = store.get_node("root").expect("get node").expect("node row");
    assert_eq!(fetched.id, "root");
    assert_eq!(fetched.output, "app.done");

    let err = store
        .add_node(NewNode::new("root", "artifact", "other"))
        .expect_err("duplicate id must fail");
    match err {
        StoreError::DuplicateNode(id) => assert_eq!(id, "root"),
        other => panic!("expected DuplicateNode, got {other:?}"),
    }
}

#[test]
fn edge_endpoints_must_exist() {
    let mut store = SqliteStore::open(temp_dir("edge_endpoints_must_exist")).expect("open store");
    store
        .add_node(NewNode::new("a", "artifact", "a.out"))
        .expect("add a");

    let err = store
        .add_edge("a", "ghost")
        .expect_err("unknown target must fail");
    match err {
        StoreError::UnknownEdgeEndpoint { target_id, .. } => assert_eq!(target_id, "ghost"),
        other => panic!("expected UnknownEdgeEndpoint, got {other:?}"),
    }
    assert!(store.list_edges().expect("list edges").is_empty());
}

#[test]
fn edges_have_set_semantics() {
    let mut store = SqliteStore::open(temp_dir("edges_have_set_semantics")).expect("open store");
    store
        .add_node(NewNode::new("a", "artifact", "a.out"))
        .expect("add a");
    store
        .add_node(NewNode::new("b", "artifact", "b.out"))
        .expect("add b");

    assert!(store.add_edge("a", "b").expect("first insert"));
    assert!(!store.add_edge("a", "b").expect("second insert is a no-op"));
    assert_eq!(store.list_edges().expect("list edges").len(), 1);
}

#[test]
fn delete_node_cascades_edges() {
    let mut store = SqliteStore::open(temp_dir("delete_node_cascades_edges")).expect("open store");
    for (id, output) in [("a", "a.out"), ("b", "b.out"), ("c", "c.out")] {
        store
            .add_node(NewNode::new(id, "artifact", output))
            .expect("add node");
    }
    store.add_edge("a", "b").expect("edge a->b");
    store.add_edge("b", "c").expect("edge b->c");

    store.delete_node("b").expect("delete b");

    assert!(store.get_node("b").expect("get b").is_none());
    assert!(
        store.list_edges().expect("list edges").is_empty(),
        "both edges touched b and must be gone"
    );

    let err = store.delete_node("b").expect_err("second delete must fail");
    assert!(matches!(err, StoreError::NodeNotFound(_)));
}

#[test]
fn update_status_stamps_completion() {
    let mut store =
        SqliteStore::open(temp_dir("update_status_stamps_completion")).expect("open store");
    store
        .add_node(NewNode::new("a", "artifact", "a.out"))
        .expect("add a");

    store
        .update_node_status("a", NodeStatus::Complete, Some(1234))
        .expect("mark complete");
    let node = store.get_node("a").expect("get a").expect("node row");
    assert_eq!(node.status, NodeStatus::Complete);
    assert_eq!(node.completed_at_ms, Some(1234));

    let err = store
        .update_node_status("ghost", NodeStatus::Complete, None)
        .expect_err("unknown node must fail");
    assert!(matches!(err, StoreError::NodeNotFound(_)));
}

#[test]
fn dependency_lookups_follow_edge_direction() {
    let mut store =
        SqliteStore::open(temp_dir("dependency_lookups_follow_edge_direction")).expect("open store");
    for (id, output) in [("a", "a.out"), ("b", "b.out")] {
        store
            .add_node(NewNode::new(id, "artifact", output))
            .expect("add node");
    }
    store.add_edge("a", "b").expect("edge a->b");

    let deps = store.dependencies_of("b").expect("dependencies of b");
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].id, "a");

    let dependents = store.dependents_of("a").expect("dependents of a");
    assert_eq!(dependents.len(), 1);
    assert_eq!(dependents[0].id, "b");
}
