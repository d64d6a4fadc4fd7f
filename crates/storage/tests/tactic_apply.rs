#![forbid(unsafe_code)]

use std::path::PathBuf;
use tc_core::graph::{DerivedStatus, NodeStatus, derive_status};
use tc_core::tactic::{Subtask, Tactic};
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

fn tactic(id: &str, output: &str) -> Tactic {
    Tactic {
        id: id.to_string(),
        tactic_type: "task".to_string(),
        output: output.to_string(),
        match_deps: Vec::new(),
        premises: Vec::new(),
        subtasks: Vec::new(),
        tags: Vec::new(),
        description: None,
        data_json: None,
    }
}

#[test]
fn simple_apply_creates_one_node_and_one_log_entry() {
    let mut store =
        SqliteStore::open(temp_dir("simple_apply_creates_one_node")).expect("open store");

    let mut impl_node = NewNode::new("impl", "module", "impl.js");
    impl_node.status = NodeStatus::Complete;
    store.add_node(impl_node).expect("add impl node");

    let mut t = tactic("write-tests", "tests.js");
    t.match_deps = vec!["impl.js".to_string()];
    store.put_tactic(&t).expect("put tactic");

    let applied = store.apply_tactic("write-tests", false).expect("apply");

    assert!(applied.deps.ready);
    assert_eq!(applied.created_nodes.len(), 1);
    let created = &applied.created_nodes[0];
    assert_eq!(created.id, "write-tests");
    assert_eq!(created.output, "tests.js");
    assert_eq!(created.status, NodeStatus::Pending);
    assert_eq!(created.created_by.as_deref(), Some("tactic:write-tests"));

    let nodes = store.list_nodes().expect("list nodes");
    assert_eq!(nodes.len(), 2, "impl node plus the expansion node");

    let edges = store.list_edges().expect("list edges");
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].source_id, "impl");
    assert_eq!(edges[0].target_id, "write-tests");

    let log = store.list_log(None, None).expect("list log");
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, "tactic_applied");
    assert_eq!(log[0].tactic_id.as_deref(), Some("write-tests"));
}

#[test]
fn missing_match_dependency_fails_before_any_write() {
    let mut store =
        SqliteStore::open(temp_dir("missing_match_fails_before_write")).expect("open store");

    let mut t = tactic("write-tests", "tests.js");
    t.match_deps = vec!["impl.js".to_string()];
    store.put_tactic(&t).expect("put tactic");

    let err = store
        .apply_tactic("write-tests", false)
        .expect_err("must fail without the dependency");
    match err {
        StoreError::MissingDependencies(missing) => {
            assert_eq!(missing, vec!["impl.js".to_string()]);
        }
        other => panic!("expected MissingDependencies, got {other:?}"),
    }

    assert!(store.list_nodes().expect("list nodes").is_empty());
    assert!(store.list_edges().expect("list edges").is_empty());
    assert!(store.list_log(None, None).expect("list log").is_empty());
}

#[test]
fn pending_producer_does_not_satisfy_a_match() {
    let mut store =
        SqliteStore::open(temp_dir("pending_producer_not_satisfying")).expect("open store");
    store
        .add_node(NewNode::new("impl", "module", "impl.js"))
        .expect("add pending impl");

    let mut t = tactic("write-tests", "tests.js");
    t.match_deps = vec!["impl.js".to_string()];
    store.put_tactic(&t).expect("put tactic");

    let err = store
        .apply_tactic("write-tests", false)
        .expect_err("pending producer must not count");
    assert!(matches!(err, StoreError::MissingDependencies(_)));
}

#[test]
fn unknown_tactic_fails() {
    let mut store = SqliteStore::open(temp_dir("unknown_tactic_fails")).expect("open store");
    let err = store
        .apply_tactic("ghost", false)
        .expect_err("unknown tactic");
    match err {
        StoreError::TacticNotFound(id) => assert_eq!(id, "ghost"),
        other => panic!("expected TacticNotFound, got {other:?}"),
    }
}

#[test]
fn subtask_expansion_wires_depends_on_and_unblocks_in_order() {
    let mut store = SqliteStore::open(temp_dir("subtask_expansion_wires")).expect("open store");

    let mut t = tactic("feature", "feature.done");
    t.subtasks = vec![
        Subtask {
            id: "s1".to_string(),
            output: "s1.out".to_string(),
            subtask_type: "task".to_string(),
            depends_on: Vec::new(),
            data_json: None,
        },
        Subtask {
            id: "s2".to_string(),
            output: "s2.out".to_string(),
            subtask_type: "task".to_string(),
            depends_on: vec!["s1".to_string()],
            data_json: None,
        },
    ];
    store.put_tactic(&t).expect("put tactic");

    let applied = store.apply_tactic("feature", false).expect("apply");
    let ids: Vec<&str> = applied
        .created_nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect();
    assert_eq!(ids, vec!["s1", "s2"], "declared order is preserved");
    assert!(
        applied
            .created_nodes
            .iter()
            .all(|node| node.parent_tactic.as_deref() == Some("feature"))
    );

    let graph = store.snapshot().expect("snapshot");
    let s2 = graph.node("s2").expect("s2 in snapshot");
    assert_eq!(derive_status(s2, &graph), DerivedStatus::Blocked);

    store
        .update_node_status("s1", NodeStatus::Complete, Some(1))
        .expect("complete s1");
    let graph = store.snapshot().expect("snapshot after completion");
    let s2 = graph.node("s2").expect("s2 in snapshot");
    assert_eq!(derive_status(s2, &graph), DerivedStatus::Ready);
}

#[test]
fn premise_without_producer_is_introduced_as_placeholder() {
    let mut store = SqliteStore::open(temp_dir("premise_placeholder")).expect("open store");

    let mut t = tactic("integrate", "integrated");
    t.premises = vec!["notes.md".to_string()];
    store.put_tactic(&t).expect("put tactic");

    let applied = store.apply_tactic("integrate", false).expect("apply");
    assert_eq!(applied.created_nodes.len(), 2);

    let placeholder = store
        .get_node("notes.md")
        .expect("get placeholder")
        .expect("placeholder row");
    assert_eq!(placeholder.node_type, "artifact");
    assert_eq!(placeholder.introduced_as.as_deref(), Some("premise"));
    assert_eq!(placeholder.created_by.as_deref(), Some("tactic:integrate"));

    // Placeholders never receive satisfied-dependency edges.
    assert!(store.list_edges().expect("list edges").is_empty());
}

#[test]
fn premise_with_incomplete_producer_is_a_conflict() {
    let mut store = SqliteStore::open(temp_dir("premise_conflict")).expect("open store");
    store
        .add_node(NewNode::new("notes", "artifact", "notes.md"))
        .expect("add pending producer");

    let mut t = tactic("integrate", "integrated");
    t.premises = vec!["notes.md".to_string()];
    store.put_tactic(&t).expect("put tactic");

    let err = store
        .apply_tactic("integrate", false)
        .expect_err("incomplete producer blocks the premise");
    match err {
        StoreError::MissingDependencies(missing) => {
            assert_eq!(missing, vec!["notes.md".to_string()]);
        }
        other => panic!("expected MissingDependencies, got {other:?}"),
    }

    // Forcing skips the check but still introduces nothing over the existing
    // producer.
    let applied = store.apply_tactic("integrate", true).expect("forced apply");
    assert_eq!(applied.created_nodes.len(), 1);
    assert_eq!(applied.created_nodes[0].id, "integrate");
}

#[test]
fn id_collision_aborts_with_no_partial_writes() {
    let mut store = SqliteStore::open(temp_dir("id_collision_aborts")).expect("open store");

    // The second subtask collides with a pre-existing node.
    store
        .add_node(NewNode::new("s2", "artifact", "occupied"))
        .expect("add colliding node");

    let mut t = tactic("feature", "feature.done");
    t.subtasks = vec![
        Subtask {
            id: "s1".to_string(),
            output: "s1.out".to_string(),
            subtask_type: "task".to_string(),
            depends_on: Vec::new(),
            data_json: None,
        },
        Subtask {
            id: "s2".to_string(),
            output: "s2.out".to_string(),
            subtask_type: "task".to_string(),
            depends_on: vec!["s1".to_string()],
            data_json: None,
        },
    ];
    store.put_tactic(&t).expect("put tactic");

    let err = store
        .apply_tactic("feature", false)
        .expect_err("collision must abort");
    match err {
        StoreError::DuplicateNode(id) => assert_eq!(id, "s2"),
        other => panic!("expected DuplicateNode, got {other:?}"),
    }

    // s1 was inserted inside the transaction and must be rolled back.
    assert!(store.get_node("s1").expect("get s1").is_none());
    assert_eq!(store.list_nodes().expect("list nodes").len(), 1);
    assert!(store.list_edges().expect("list edges").is_empty());
    assert!(store.list_log(None, None).expect("list log").is_empty());
}

#[test]
fn every_complete_producer_is_linked_to_every_expansion_node() {
    let mut store = SqliteStore::open(temp_dir("every_producer_linked")).expect("open store");

    for id in ["impl-a", "impl-b"] {
        let mut node = NewNode::new(id, "module", "impl.js");
        node.status = NodeStatus::Complete;
        store.add_node(node).expect("add producer");
    }

    let mut t = tactic("feature", "feature.done");
    t.match_deps = vec!["impl.js".to_string()];
    t.subtasks = vec![
        Subtask {
            id: "s1".to_string(),
            output: "s1.out".to_string(),
            subtask_type: "task".to_string(),
            depends_on: Vec::new(),
            data_json: None,
        },
        Subtask {
            id: "s2".to_string(),
            output: "s2.out".to_string(),
            subtask_type: "task".to_string(),
            depends_on: vec!["s1".to_string()],
            data_json: None,
        },
    ];
    store.put_tactic(&t).expect("put tactic");

    let applied = store.apply_tactic("feature", false).expect("apply");
    // One depends_on edge plus 2 producers x 2 subtasks.
    assert_eq!(applied.edges.len(), 5);

    let edges = store.list_edges().expect("list edges");
    for source in ["impl-a", "impl-b"] {
        for target in ["s1", "s2"] {
            assert!(
                edges
                    .iter()
                    .any(|edge| edge.source_id == source && edge.target_id == target),
                "expected edge {source} -> {target}"
            );
        }
    }
}
