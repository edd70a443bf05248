//! Impact and provenance report builders: thin wrappers around the graph
//! store's BFS/DFS traversal primitives that add report shaping.

use serde::{Deserialize, Serialize};

use schema_graph_store::{DownstreamEntry, EdgeType, Graph};

use crate::error::{AnalysisError, Result};

/// Fixed placeholder confidence for provenance chain entries. A future
/// per-edge confidence metric would replace this; until one exists, every
/// upstream step is reported at the same confidence.
pub const PLACEHOLDER_PROVENANCE_CONFIDENCE: f64 = 0.9;

/// Forward-reachable impact of changing `root`, bounded by `max_depth` hops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactReport {
    pub root: String,
    pub max_depth: usize,
    pub entries: Vec<DownstreamEntry>,
}

/// One step of a node's upstream lineage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceStep {
    pub node_id: String,
    pub relationship: EdgeType,
    pub confidence: f64,
}

/// Full upstream lineage of `root`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceReport {
    pub root: String,
    pub chain: Vec<ProvenanceStep>,
}

/// Build the downstream impact set of `root` up to `max_depth` hops.
///
/// Errors with `AnalysisError::NotFound` if `root` does not name a node
/// present in `graph`.
pub fn build_impact_report(graph: &Graph, root: &str, max_depth: usize) -> Result<ImpactReport> {
    if graph.get_node(root).is_none() {
        return Err(AnalysisError::NotFound(root.to_string()));
    }
    Ok(ImpactReport {
        root: root.to_string(),
        max_depth,
        entries: graph.get_downstream(root, max_depth),
    })
}

/// Build the upstream provenance chain of `root`.
///
/// Errors with `AnalysisError::NotFound` if `root` does not name a node
/// present in `graph`.
pub fn build_provenance_report(graph: &Graph, root: &str) -> Result<ProvenanceReport> {
    if graph.get_node(root).is_none() {
        return Err(AnalysisError::NotFound(root.to_string()));
    }
    let chain = graph
        .get_provenance(root)
        .into_iter()
        .map(|entry| ProvenanceStep {
            node_id: entry.node_id,
            relationship: entry.relationship,
            confidence: PLACEHOLDER_PROVENANCE_CONFIDENCE,
        })
        .collect();
    Ok(ProvenanceReport {
        root: root.to_string(),
        chain,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use schema_graph_store::{Edge, FileHash, Node, NodeType, Property};

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            type_: NodeType::Schema,
            name: id.to_string(),
            file_path: format!("{id}.ts"),
            file_hash: FileHash(format!("hash-{id}")),
            intent: None,
            properties: vec![Property::new("id", "string", true)],
            metadata: serde_json::Map::new(),
            last_modified: Utc::now(),
        }
    }

    #[test]
    fn downstream_impact_reports_distance_and_path_chain() {
        // A -> B -> C -> D
        let mut g = Graph::new();
        for id in ["a", "b", "c", "d"] {
            g.add_node(node(id));
        }
        g.add_edge(Edge::new("ab", "a", "b", EdgeType::Uses, 0.9));
        g.add_edge(Edge::new("bc", "b", "c", EdgeType::Uses, 0.9));
        g.add_edge(Edge::new("cd", "c", "d", EdgeType::Uses, 0.9));

        let report = build_impact_report(&g, "a", 3).unwrap();
        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.entries[2].path, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn provenance_report_carries_placeholder_confidence() {
        let mut g = Graph::new();
        for id in ["a", "b"] {
            g.add_node(node(id));
        }
        g.add_edge(Edge::new("ab", "a", "b", EdgeType::Extends, 0.9));

        let report = build_provenance_report(&g, "b").unwrap();
        assert_eq!(report.chain.len(), 1);
        assert_eq!(report.chain[0].node_id, "a");
        assert_eq!(report.chain[0].confidence, PLACEHOLDER_PROVENANCE_CONFIDENCE);
    }

    #[test]
    fn impact_report_on_unknown_root_is_not_found() {
        let g = Graph::new();
        assert!(matches!(
            build_impact_report(&g, "does-not-exist", 3),
            Err(AnalysisError::NotFound(id)) if id == "does-not-exist"
        ));
    }

    #[test]
    fn provenance_report_on_unknown_root_is_not_found() {
        let g = Graph::new();
        assert!(matches!(
            build_provenance_report(&g, "does-not-exist"),
            Err(AnalysisError::NotFound(id)) if id == "does-not-exist"
        ));
    }
}
