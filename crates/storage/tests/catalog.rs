#![forbid(unsafe_code)]

use std::path::PathBuf;
use tc_core::tactic::{Subtask, Tactic};
use tc_storage::{SqliteStore, TacticFilters};

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

fn full_tactic() -> Tactic {
    Tactic {
        id: "write-tests".to_string(),
        tactic_type: "quality".to_string(),
        output: "tests.js".to_string(),
        match_deps: vec!["impl.js".to_string(), "spec.md".to_string()],
        premises: vec!["style.md".to_string()],
        subtasks: vec![
            Subtask {
                id: "unit".to_string(),
                output: "unit.js".to_string(),
                subtask_type: "task".to_string(),
                depends_on: Vec::new(),
                data_json: Some("{\"kind\":\"unit\"}".to_string()),
            },
            Subtask {
                id: "integration".to_string(),
                output: "integration.js".to_string(),
                subtask_type: "task".to_string(),
                depends_on: vec!["unit".to_string()],
                data_json: None,
            },
        ],
        tags: vec!["testing".to_string(), "quality".to_string()],
        description: Some("Write the test suite".to_string()),
        data_json: None,
    }
}

#[test]
fn put_and_get_round_trips_every_field() {
    let mut store = SqliteStore::open(temp_dir("put_and_get_round_trips")).expect("open store");
    let tactic = full_tactic();
    store.put_tactic(&tactic).expect("put tactic");

    let read = store
        .get_tactic("write-tests")
        .expect("get tactic")
        .expect("tactic row");
    assert_eq!(read.tactic_type, "quality");
    assert_eq!(read.output, "tests.js");
    assert_eq!(read.match_deps, tactic.match_deps);
    assert_eq!(read.premises, tactic.premises);
    assert_eq!(read.tags, tactic.tags);
    assert_eq!(read.description, tactic.description);
    assert_eq!(read.subtasks.len(), 2);
    assert_eq!(read.subtasks[0].id, "unit");
    assert_eq!(
        read.subtasks[0].data_json.as_deref(),
        Some("{\"kind\":\"unit\"}")
    );
    assert_eq!(read.subtasks[1].depends_on, vec!["unit".to_string()]);
}

#[test]
fn put_replaces_dependencies_and_subtasks() {
    let mut store = SqliteStore::open(temp_dir("put_replaces")).expect("open store");
    store.put_tactic(&full_tactic()).expect("first put");

    let mut replacement = full_tactic();
    replacement.match_deps = vec!["other.js".to_string()];
    replacement.premises = Vec::new();
    replacement.subtasks = Vec::new();
    store.put_tactic(&replacement).expect("replace");

    let read = store
        .get_tactic("write-tests")
        .expect("get tactic")
        .expect("tactic row");
    assert_eq!(read.match_deps, vec!["other.js".to_string()]);
    assert!(read.premises.is_empty());
    assert!(read.subtasks.is_empty());
}

#[test]
fn list_preserves_catalog_order_and_applies_filters() {
    let mut store = SqliteStore::open(temp_dir("list_filters")).expect("open store");

    let mut first = full_tactic();
    first.id = "alpha".to_string();
    first.tactic_type = "setup".to_string();
    first.tags = vec!["scaffold".to_string()];
    first.description = Some("Bootstrap the repository".to_string());
    store.put_tactic(&first).expect("put alpha");

    let mut second = full_tactic();
    second.id = "beta".to_string();
    store.put_tactic(&second).expect("put beta");

    let all = store
        .list_tactics(&TacticFilters::default())
        .expect("list all");
    let ids: Vec<&str> = all.iter().map(|tactic| tactic.id.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "beta"]);

    let by_type = store
        .list_tactics(&TacticFilters {
            tactic_type: Some("setup".to_string()),
            ..TacticFilters::default()
        })
        .expect("filter by type");
    assert_eq!(by_type.len(), 1);
    assert_eq!(by_type[0].id, "alpha");

    let by_tag = store
        .list_tactics(&TacticFilters {
            tags: vec!["testing".to_string()],
            ..TacticFilters::default()
        })
        .expect("filter by tag");
    assert_eq!(by_tag.len(), 1);
    assert_eq!(by_tag[0].id, "beta");

    let by_keyword = store
        .list_tactics(&TacticFilters {
            keywords: vec!["bootstrap".to_string()],
            ..TacticFilters::default()
        })
        .expect("filter by keyword");
    assert_eq!(by_keyword.len(), 1);
    assert_eq!(by_keyword[0].id, "alpha");
}

#[test]
fn import_tactics_loads_the_whole_list() {
    let mut store = SqliteStore::open(temp_dir("import_tactics")).expect("open store");

    let mut first = full_tactic();
    first.id = "one".to_string();
    let mut second = full_tactic();
    second.id = "two".to_string();

    let count = store
        .import_tactics(&[first, second])
        .expect("import tactics");
    assert_eq!(count, 2);
    assert!(store.get_tactic("one").expect("get one").is_some());
    assert!(store.get_tactic("two").expect("get two").is_some());
}
