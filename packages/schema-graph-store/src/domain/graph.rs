//! The persistent dependency graph.
//!
//! `Graph` is both the node/edge container and the store that persists and
//! traverses it. Some codebases split those into a domain model plus a
//! trait-backed store, but here the store has exactly one implementation
//! (an in-memory map persisted to a JSON file), so a single type carries
//! both responsibilities.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Edge, FileHash, Node};
use crate::error::{GraphStoreError, Result};

/// Current on-disk schema version. Bump when the persisted shape changes in
/// a way that is not forward compatible.
pub const GRAPH_FORMAT_VERSION: &str = "1.0";

/// One hop of a `getDownstream` BFS result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownstreamEntry {
    pub node_id: String,
    pub distance: usize,
    /// Node ids from the traversal root to `node_id`, inclusive of both ends.
    pub path: Vec<String>,
}

/// One hop of a `getProvenance` reverse-DFS result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    pub node_id: String,
    /// Edge type of the edge that led from `node_id` to its child in the
    /// traversal (i.e. the relationship explaining why `node_id` is
    /// upstream of whatever was being explained).
    pub relationship: crate::domain::EdgeType,
}

/// The persisted shape of a graph: a plain JSON document with `nodes`,
/// `edges`, `version`, `lastCrawl` fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphDocument {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    version: String,
    #[serde(rename = "lastCrawl")]
    last_crawl: DateTime<Utc>,
}

/// In-memory dependency graph with content-hash-keyed change detection and
/// cycle-safe traversal.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: HashMap<String, Node>,
    /// Insertion order of node ids, preserved across add/remove so that a
    /// `save()` writes a stable, human-reviewable ordering.
    node_order: Vec<String>,
    edges: HashMap<String, Edge>,
    edge_order: Vec<String>,
    pub version: String,
    pub last_crawl: DateTime<Utc>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            node_order: Vec::new(),
            edges: HashMap::new(),
            edge_order: Vec::new(),
            version: GRAPH_FORMAT_VERSION.to_string(),
            last_crawl: Utc::now(),
        }
    }

    // ── Hashing / change detection ──────────────────────────────────────

    /// SHA-256 of the raw bytes at `path`, hex-encoded.
    pub fn compute_file_hash(path: &Path) -> Result<FileHash> {
        let bytes = std::fs::read(path)?;
        Ok(FileHash::of_bytes(&bytes))
    }

    /// True iff `id` is absent from the graph, or present with a different
    /// stored hash than `hash`.
    pub fn has_node_changed(&self, id: &str, hash: &FileHash) -> bool {
        match self.nodes.get(id) {
            Some(node) => &node.file_hash != hash,
            None => true,
        }
    }

    // ── Mutation ─────────────────────────────────────────────────────────

    /// Insert or overwrite a node by id (idempotent upsert).
    pub fn add_node(&mut self, node: Node) {
        if !self.nodes.contains_key(&node.id) {
            self.node_order.push(node.id.clone());
        }
        self.nodes.insert(node.id.clone(), node);
    }

    /// Remove a node and, atomically, every edge touching it as source or
    /// target.
    pub fn remove_node(&mut self, id: &str) {
        if self.nodes.remove(id).is_none() {
            return;
        }
        self.node_order.retain(|n| n != id);
        let dangling: Vec<String> = self
            .edges
            .values()
            .filter(|e| e.source == id || e.target == id)
            .map(|e| e.id.clone())
            .collect();
        for edge_id in dangling {
            self.edges.remove(&edge_id);
            self.edge_order.retain(|e| e != &edge_id);
        }
    }

    /// Insert or overwrite an edge by id (idempotent upsert).
    pub fn add_edge(&mut self, edge: Edge) {
        if !self.edges.contains_key(&edge.id) {
            self.edge_order.push(edge.id.clone());
        }
        self.edges.insert(edge.id.clone(), edge);
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_all_nodes(&self) -> Vec<&Node> {
        self.node_order
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    pub fn get_all_edges(&self) -> Vec<&Edge> {
        self.edge_order
            .iter()
            .filter_map(|id| self.edges.get(id))
            .collect()
    }

    pub fn get_incoming_edges(&self, id: &str) -> Vec<&Edge> {
        self.get_all_edges()
            .into_iter()
            .filter(|e| e.target == id)
            .collect()
    }

    pub fn get_outgoing_edges(&self, id: &str) -> Vec<&Edge> {
        self.get_all_edges()
            .into_iter()
            .filter(|e| e.source == id)
            .collect()
    }

    // ── Traversal ────────────────────────────────────────────────────────

    /// BFS from `id` following edges source→target, up to `max_depth` hops.
    /// Cycle-safe: each reachable node is visited at most once, at its
    /// shortest-path distance.
    pub fn get_downstream(&self, id: &str, max_depth: usize) -> Vec<DownstreamEntry> {
        let mut results = Vec::new();
        if max_depth == 0 {
            return results;
        }
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(id.to_string());

        let mut queue: VecDeque<(String, Vec<String>)> = VecDeque::new();
        queue.push_back((id.to_string(), vec![id.to_string()]));

        while let Some((current, path)) = queue.pop_front() {
            let distance = path.len() - 1;
            if distance >= max_depth {
                continue;
            }
            for edge in self.get_outgoing_edges(&current) {
                if visited.contains(&edge.target) {
                    continue;
                }
                visited.insert(edge.target.clone());
                let mut next_path = path.clone();
                next_path.push(edge.target.clone());
                results.push(DownstreamEntry {
                    node_id: edge.target.clone(),
                    distance: distance + 1,
                    path: next_path.clone(),
                });
                queue.push_back((edge.target.clone(), next_path));
            }
        }

        results
    }

    /// Reverse DFS from `id` following edges target→source, unbounded depth,
    /// cycle-safe via a visited set. Pre-order.
    ///
    /// Uses an explicit work-stack of (incoming edges, cursor) frames rather
    /// than function recursion, so an unbounded upstream chain does not grow
    /// the call stack one frame per hop.
    pub fn get_provenance(&self, id: &str) -> Vec<ProvenanceEntry> {
        let mut results = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(id.to_string());

        let mut stack: Vec<(Vec<&Edge>, usize)> = vec![(self.get_incoming_edges(id), 0)];

        while !stack.is_empty() {
            let (len, cursor) = {
                let top = stack.last().unwrap();
                (top.0.len(), top.1)
            };
            if cursor >= len {
                stack.pop();
                continue;
            }

            let edge = stack.last().unwrap().0[cursor];
            stack.last_mut().unwrap().1 += 1;

            if visited.contains(&edge.source) {
                continue;
            }
            visited.insert(edge.source.clone());
            results.push(ProvenanceEntry {
                node_id: edge.source.clone(),
                relationship: edge.type_,
            });

            stack.push((self.get_incoming_edges(&edge.source), 0));
        }

        results
    }

    // ── Persistence ──────────────────────────────────────────────────────

    /// Persist the graph as a pretty-printed JSON document.
    pub fn save(&self, path: &Path) -> Result<()> {
        let doc = GraphDocument {
            nodes: self.get_all_nodes().into_iter().cloned().collect(),
            edges: self.get_all_edges().into_iter().cloned().collect(),
            version: self.version.clone(),
            last_crawl: self.last_crawl,
        };
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        doc.serialize(&mut ser)
            .map_err(GraphStoreError::Corrupt)?;
        std::fs::write(path, buf)?;
        Ok(())
    }

    /// Load a persisted graph. A missing file or corrupt payload degrades
    /// to an empty graph with a logged warning. This never returns an
    /// error, since forward progress from an empty graph beats refusing
    /// to start over a stale cache.
    pub fn load(path: &Path) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "graph file unreadable, starting from an empty graph");
                return Self::new();
            }
        };
        match serde_json::from_slice::<GraphDocument>(&bytes) {
            Ok(doc) => {
                let mut graph = Self::new();
                graph.version = doc.version;
                graph.last_crawl = doc.last_crawl;
                for node in doc.nodes {
                    graph.add_node(node);
                }
                for edge in doc.edges {
                    graph.add_edge(edge);
                }
                graph
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "graph file corrupt, starting from an empty graph");
                Self::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EdgeType, NodeType, Property};

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

    fn edge(id: &str, source: &str, target: &str, type_: EdgeType) -> Edge {
        Edge::new(id, source, target, type_, 0.9)
    }

    #[test]
    fn remove_node_removes_touching_edges() {
        let mut g = Graph::new();
        g.add_node(node("a"));
        g.add_node(node("b"));
        g.add_edge(edge("e1", "a", "b", EdgeType::Uses));

        g.remove_node("a");

        assert!(g.get_node("a").is_none());
        assert!(g.get_all_edges().is_empty());
    }

    #[test]
    fn has_node_changed_true_when_absent_or_differing() {
        let mut g = Graph::new();
        assert!(g.has_node_changed("a", &FileHash("x".into())));
        g.add_node(node("a"));
        assert!(!g.has_node_changed("a", &FileHash("hash-a".into())));
        assert!(g.has_node_changed("a", &FileHash("other".into())));
    }

    #[test]
    fn downstream_respects_depth_bound_and_records_paths() {
        // A -> B -> C -> D
        let mut g = Graph::new();
        for id in ["a", "b", "c", "d"] {
            g.add_node(node(id));
        }
        g.add_edge(edge("ab", "a", "b", EdgeType::Uses));
        g.add_edge(edge("bc", "b", "c", EdgeType::Uses));
        g.add_edge(edge("cd", "c", "d", EdgeType::Uses));

        let result = g.get_downstream("a", 3);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].distance, 1);
        assert_eq!(result[0].path, vec!["a", "b"]);
        assert_eq!(result[1].distance, 2);
        assert_eq!(result[1].path, vec!["a", "b", "c"]);
        assert_eq!(result[2].distance, 3);
        assert_eq!(result[2].path, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn downstream_is_cycle_safe() {
        let mut g = Graph::new();
        for id in ["a", "b"] {
            g.add_node(node(id));
        }
        g.add_edge(edge("ab", "a", "b", EdgeType::Uses));
        g.add_edge(edge("ba", "b", "a", EdgeType::Uses));

        let result = g.get_downstream("a", 5);
        // Only b is reachable; a is the root and is never re-added.
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].node_id, "b");
    }

    #[test]
    fn provenance_is_cycle_safe_and_labels_relationship() {
        let mut g = Graph::new();
        for id in ["a", "b", "c"] {
            g.add_node(node(id));
        }
        g.add_edge(edge("ab", "a", "b", EdgeType::Extends));
        g.add_edge(edge("bc", "b", "c", EdgeType::Uses));
        g.add_edge(edge("ca", "c", "a", EdgeType::Uses)); // cycle back to a

        let result = g.get_provenance("c");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].node_id, "b");
        assert_eq!(result[0].relationship, EdgeType::Uses);
        assert_eq!(result[1].node_id, "a");
        assert_eq!(result[1].relationship, EdgeType::Extends);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let mut g = Graph::new();
        g.add_node(node("a"));
        g.add_node(node("b"));
        g.add_edge(edge("ab", "a", "b", EdgeType::Uses));
        g.save(&path).unwrap();

        let loaded = Graph::load(&path);
        assert_eq!(loaded.get_all_nodes().len(), 2);
        assert_eq!(loaded.get_all_edges().len(), 1);
        assert_eq!(loaded.version, GRAPH_FORMAT_VERSION);
    }

    #[test]
    fn load_degrades_to_empty_graph_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.json");
        let loaded = Graph::load(&path);
        assert!(loaded.get_all_nodes().is_empty());
    }

    #[test]
    fn load_degrades_to_empty_graph_on_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        std::fs::write(&path, b"not json").unwrap();
        let loaded = Graph::load(&path);
        assert!(loaded.get_all_nodes().is_empty());
    }
}
