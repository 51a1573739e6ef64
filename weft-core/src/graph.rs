//! Knowledge graph assembly.
//!
//! Datasets, their columns, and the discovered relationships become a plain
//! node/edge list for the graph view. There are no back-pointers: nodes and
//! edges reference each other by id, so traversal is index lookup and no
//! ownership cycles exist.
//!
//! Node and edge ids are derived from their endpoints and kind, which makes
//! repeated assembly idempotent: the same workspace always yields the same
//! graph, byte for byte.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::analyzers::inference::{InferredType, TypeInferenceEngine};
use crate::core::{Value, Workspace};
use crate::discovery::RelationshipDiscovery;

/// Kind of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Dataset,
    Column,
}

/// Kind of a graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Dataset -> column containment.
    Contains,
    /// Inferred foreign key between columns of two datasets.
    InferredFk,
    /// Same-named, same-typed columns that did not qualify as a foreign key.
    SharedField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

/// The assembled node/edge list for visualization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

fn dataset_node_id(dataset_id: &str) -> String {
    format!("ds:{dataset_id}")
}

fn column_node_id(dataset_id: &str, column: &str) -> String {
    format!("col:{dataset_id}:{column}")
}

/// Assembles the workspace graph with a default discovery pass.
pub fn build_graph(workspace: &Workspace) -> WorkspaceGraph {
    build_graph_with(workspace, &RelationshipDiscovery::new())
}

/// Assembles the workspace graph using `discovery` for relationship edges.
#[instrument(skip(workspace, discovery))]
pub fn build_graph_with(
    workspace: &Workspace,
    discovery: &RelationshipDiscovery,
) -> WorkspaceGraph {
    let mut graph = WorkspaceGraph::default();

    // Column types drive shared-field pairing.
    let engine = TypeInferenceEngine::new();
    let mut column_types: Vec<(usize, usize, InferredType)> = Vec::new();

    for (di, dataset) in workspace.datasets.iter().enumerate() {
        graph.nodes.push(GraphNode {
            id: dataset_node_id(&dataset.id),
            label: dataset.name.clone(),
            node_type: NodeType::Dataset,
        });
        let sample = discovery.config().sampling.sample(&dataset.records);
        for (ci, column) in dataset.columns.iter().enumerate() {
            graph.nodes.push(GraphNode {
                id: column_node_id(&dataset.id, column),
                label: column.clone(),
                node_type: NodeType::Column,
            });
            graph.edges.push(GraphEdge {
                id: format!("contains:{}:{}", dataset.id, column),
                source: dataset_node_id(&dataset.id),
                target: column_node_id(&dataset.id, column),
                label: "contains".into(),
                edge_type: EdgeType::Contains,
            });
            let values: Vec<&Value> = sample
                .rows
                .iter()
                .filter_map(|record| record.get(column))
                .collect();
            let inferred = engine.infer(column, values.into_iter()).inferred_type;
            column_types.push((di, ci, inferred));
        }
    }

    // Foreign-key edges, plus the endpoint pairs they already cover.
    let fks = discovery.inferred_foreign_keys(workspace);
    let mut fk_pairs: BTreeSet<(String, String)> = BTreeSet::new();
    for fk in &fks {
        let source = column_node_id(&fk.source_dataset_id, &fk.source_column);
        let target = column_node_id(&fk.target_dataset_id, &fk.target_column);
        fk_pairs.insert(order_pair(&source, &target));
        graph.edges.push(GraphEdge {
            id: format!(
                "fk:{}.{}->{}.{}",
                fk.source_dataset_id, fk.source_column, fk.target_dataset_id, fk.target_column
            ),
            source,
            target,
            label: format!("fk {:.0}%", fk.overlap_pct),
            edge_type: EdgeType::InferredFk,
        });
    }

    // Shared fields: same name, same inferred type, across distinct
    // datasets, not already connected by an inferred foreign key.
    let mut shared_seen: BTreeSet<(String, String)> = BTreeSet::new();
    for &(di_a, ci_a, type_a) in &column_types {
        for &(di_b, ci_b, type_b) in &column_types {
            if di_b <= di_a || type_a != type_b {
                continue;
            }
            let dataset_a = &workspace.datasets[di_a];
            let dataset_b = &workspace.datasets[di_b];
            let column_a = &dataset_a.columns[ci_a];
            let column_b = &dataset_b.columns[ci_b];
            if column_a != column_b {
                continue;
            }
            let pair = order_pair(
                &column_node_id(&dataset_a.id, column_a),
                &column_node_id(&dataset_b.id, column_b),
            );
            if fk_pairs.contains(&pair) || !shared_seen.insert(pair.clone()) {
                continue;
            }
            graph.edges.push(GraphEdge {
                id: format!("shared:{}|{}", pair.0, pair.1),
                source: pair.0,
                target: pair.1,
                label: "shared field".into(),
                edge_type: EdgeType::SharedField,
            });
        }
    }

    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "assembled workspace graph"
    );
    graph
}

fn order_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}
