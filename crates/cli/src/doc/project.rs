#![forbid(unsafe_code)]

use super::{DocError, data_to_json, data_to_yaml};
use crate::timefmt::{rfc3339_to_ts_ms, ts_ms_to_rfc3339};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tc_core::graph::{Edge, GraphSnapshot, NodeStatus};
use tc_storage::{NewNode, ProjectImport, ProjectMeta};

/// Human-editable project document. `blocks` is derived from outgoing edges
/// on export and ignored on import; edges are rebuilt from each node's
/// dependency list.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectDoc {
    pub project: ProjectSection,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub nodes: BTreeMap<String, NodeDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectSection {
    pub name: String,
    #[serde(default)]
    pub root_goal: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeDoc {
    #[serde(rename = "type")]
    pub node_type: String,
    pub output: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_tactic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduced_as: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<NodeDependencies>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_yaml::Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NodeDependencies {
    #[serde(default, rename = "match")]
    pub match_ids: Vec<String>,
}

pub fn render_project_doc(
    meta: &ProjectMeta,
    snapshot: &GraphSnapshot,
) -> Result<String, DocError> {
    let mut nodes = BTreeMap::new();
    for node in snapshot.nodes() {
        let dependency_ids: Vec<String> = snapshot
            .dependencies_of(&node.id)
            .iter()
            .map(|dep| dep.id.clone())
            .collect();
        let blocks: Vec<String> = snapshot
            .dependents_of(&node.id)
            .iter()
            .map(|dep| dep.id.clone())
            .collect();

        nodes.insert(
            node.id.clone(),
            NodeDoc {
                node_type: node.node_type.clone(),
                output: node.output.clone(),
                status: node.status.as_str().to_string(),
                created_by: node.created_by.clone(),
                created_at: Some(ts_ms_to_rfc3339(node.created_at_ms)),
                completed_at: node.completed_at_ms.map(ts_ms_to_rfc3339),
                parent_tactic: node.parent_tactic.clone(),
                introduced_as: node.introduced_as.clone(),
                dependencies: if dependency_ids.is_empty() {
                    None
                } else {
                    Some(NodeDependencies {
                        match_ids: dependency_ids,
                    })
                },
                blocks,
                data: data_to_yaml(node.data_json.as_deref())?,
            },
        );
    }

    let doc = ProjectDoc {
        project: ProjectSection {
            name: meta.name.clone().unwrap_or_else(|| "untitled".to_string()),
            root_goal: meta.root_goal.clone(),
        },
        nodes,
    };
    serde_yaml::to_string(&doc).map_err(|err| DocError::Malformed(err.to_string()))
}

pub fn parse_project_doc(raw: &str) -> Result<ProjectImport, DocError> {
    let doc: ProjectDoc =
        serde_yaml::from_str(raw).map_err(|err| DocError::Malformed(err.to_string()))?;

    let mut nodes = Vec::with_capacity(doc.nodes.len());
    let mut edges = Vec::new();

    for (id, node) in &doc.nodes {
        let status = NodeStatus::parse(&node.status)
            .ok_or_else(|| DocError::Malformed(format!("node {id}: unknown status {}", node.status)))?;
        let created_at_ms = node
            .created_at
            .as_deref()
            .map(|value| {
                rfc3339_to_ts_ms(value)
                    .ok_or_else(|| DocError::Malformed(format!("node {id}: bad created_at")))
            })
            .transpose()?;
        let completed_at_ms = node
            .completed_at
            .as_deref()
            .map(|value| {
                rfc3339_to_ts_ms(value)
                    .ok_or_else(|| DocError::Malformed(format!("node {id}: bad completed_at")))
            })
            .transpose()?;

        nodes.push(NewNode {
            id: id.clone(),
            node_type: node.node_type.clone(),
            output: node.output.clone(),
            status,
            created_by: node.created_by.clone(),
            parent_tactic: node.parent_tactic.clone(),
            introduced_as: node.introduced_as.clone(),
            data_json: data_to_json(node.data.as_ref())?,
            created_at_ms,
            completed_at_ms,
        });

        if let Some(dependencies) = &node.dependencies {
            for source in &dependencies.match_ids {
                edges.push(Edge {
                    source_id: source.clone(),
                    target_id: id.clone(),
                });
            }
        }
    }

    Ok(ProjectImport {
        name: Some(doc.project.name),
        root_goal: doc.project.root_goal,
        nodes,
        edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_core::graph::Node;

    fn node(id: &str, output: &str, status: NodeStatus) -> Node {
        Node {
            id: id.to_string(),
            node_type: "artifact".to_string(),
            output: output.to_string(),
            status,
            created_by: None,
            created_at_ms: 1_700_000_000_000,
            completed_at_ms: None,
            parent_tactic: None,
            introduced_as: None,
            data_json: None,
        }
    }

    #[test]
    fn render_then_parse_is_isomorphic() {
        let mut impl_node = node("impl", "impl.js", NodeStatus::Complete);
        impl_node.completed_at_ms = Some(1_700_000_100_000);
        impl_node.data_json = Some("{\"reviewed\":true}".to_string());
        let snapshot = GraphSnapshot::new(
            vec![impl_node, node("tests", "tests.js", NodeStatus::Pending)],
            vec![Edge {
                source_id: "impl".to_string(),
                target_id: "tests".to_string(),
            }],
        );
        let meta = ProjectMeta {
            name: Some("demo".to_string()),
            root_goal: Some("tests".to_string()),
        };

        let rendered = render_project_doc(&meta, &snapshot).expect("render");
        let import = parse_project_doc(&rendered).expect("parse");

        assert_eq!(import.name.as_deref(), Some("demo"));
        assert_eq!(import.root_goal.as_deref(), Some("tests"));
        assert_eq!(import.nodes.len(), 2);

        let impl_new = import
            .nodes
            .iter()
            .find(|node| node.id == "impl")
            .expect("impl node");
        assert_eq!(impl_new.status, NodeStatus::Complete);
        assert_eq!(impl_new.created_at_ms, Some(1_700_000_000_000));
        assert_eq!(impl_new.completed_at_ms, Some(1_700_000_100_000));
        assert_eq!(impl_new.data_json.as_deref(), Some("{\"reviewed\":true}"));

        assert_eq!(import.edges.len(), 1);
        assert_eq!(import.edges[0].source_id, "impl");
        assert_eq!(import.edges[0].target_id, "tests");
    }

    #[test]
    fn unknown_status_is_malformed() {
        let raw = r#"
project:
  name: demo
  root_goal: null
nodes:
  a:
    type: artifact
    output: a.out
    status: sideways
"#;
        let err = parse_project_doc(raw).expect_err("bad status");
        assert!(matches!(err, DocError::Malformed(_)));
    }

    #[test]
    fn not_a_document_is_malformed() {
        let err = parse_project_doc("- 1\n- 2\n").expect_err("shape mismatch");
        assert!(matches!(err, DocError::Malformed(_)));
    }

    #[test]
    fn blocks_are_ignored_on_import() {
        let raw = r#"
project:
  name: demo
  root_goal: null
nodes:
  a:
    type: artifact
    output: a.out
    status: pending
    blocks: [ghost]
"#;
        let import = parse_project_doc(raw).expect("parse");
        assert!(import.edges.is_empty());
    }
}
