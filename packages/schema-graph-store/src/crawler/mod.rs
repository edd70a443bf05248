//! Crawler: orchestrates scanners across a file set and reconciles their
//! output against the graph.

mod glob;
mod scanner;

pub use scanner::{ScanOutput, Scanner, ScannerRegistry};

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::domain::Graph;
use crate::error::Result;

/// Default glob patterns covering common schema-file suffixes: statically
/// typed interface/type declarations plus machine-readable API descriptions.
pub const DEFAULT_PATTERNS: &[&str] = &[
    "**/*.ts",
    "**/*.proto",
    "**/*.json",
    "**/*.yaml",
    "**/*.yml",
];

/// Directories excluded from every crawl regardless of `patterns`.
const EXCLUDED_DIRS: &[&str] = &["target", ".git", "node_modules", "dist", "build"];

/// Crawl request options.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// When true, skip re-parsing nodes whose file hash has not changed.
    pub diff: bool,
    /// Glob patterns to resolve; `None` uses `DEFAULT_PATTERNS`.
    pub patterns: Option<Vec<String>>,
}

impl Default for CrawlRequest {
    fn default() -> Self {
        Self {
            diff: true,
            patterns: None,
        }
    }
}

/// Summary of one crawl's net effect against the pre-crawl graph state.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlResult {
    pub added: usize,
    pub modified: usize,
    pub removed: usize,
    pub unchanged: usize,
    /// Total files considered this crawl, including `unchanged` ones.
    pub files_scanned: usize,
    pub duration: Duration,
}

/// Orchestrates a full crawl of `root` against a persisted `Graph`.
pub struct Crawler {
    root: PathBuf,
    graph_path: PathBuf,
    registry: ScannerRegistry,
}

impl Crawler {
    pub fn new(root: impl Into<PathBuf>, graph_path: impl Into<PathBuf>, registry: ScannerRegistry) -> Self {
        Self {
            root: root.into(),
            graph_path: graph_path.into(),
            registry,
        }
    }

    /// Run one crawl. Loads the current graph from disk, reconciles scanner
    /// output against it, and persists the result. On any scanner or I/O
    /// failure the on-disk graph is left untouched; this is all-or-nothing
    /// at the save step.
    pub async fn crawl(&self, request: CrawlRequest) -> Result<CrawlResult> {
        let start = Instant::now();
        let patterns: Vec<String> = request
            .patterns
            .unwrap_or_else(|| DEFAULT_PATTERNS.iter().map(|s| s.to_string()).collect());

        let files = self.resolve_files(&patterns);
        tracing::info!(root = %self.root.display(), files = files.len(), "crawl started");

        let previous = Graph::load(&self.graph_path);
        let existing: HashSet<String> = previous.get_all_nodes().iter().map(|n| n.id.clone()).collect();

        let mut next = previous.clone();
        let mut processed: HashSet<String> = HashSet::new();
        let mut added = 0usize;
        let mut modified = 0usize;
        let mut unchanged = 0usize;

        for file in &files {
            let hash = Graph::compute_file_hash(file)?;
            let scanner = match self.registry.resolve(file) {
                Some(scanner) => scanner,
                None => continue,
            };
            let output = scanner.scan(file, &hash).await?;

            for node in output.nodes {
                processed.insert(node.id.clone());
                if request.diff && !previous.has_node_changed(&node.id, &node.file_hash) {
                    unchanged += 1;
                    tracing::debug!(node_id = %node.id, "unchanged, skipping re-parse");
                    continue;
                }
                if existing.contains(&node.id) {
                    modified += 1;
                } else {
                    added += 1;
                }
                next.add_node(node);
            }
            for edge in output.edges {
                next.add_edge(edge);
            }
        }

        let removed_ids: Vec<String> = existing.difference(&processed).cloned().collect();
        let removed = removed_ids.len();
        for id in &removed_ids {
            next.remove_node(id);
        }

        next.last_crawl = chrono::Utc::now();
        next.save(&self.graph_path)?;

        let result = CrawlResult {
            added,
            modified,
            removed,
            unchanged,
            files_scanned: files.len(),
            duration: start.elapsed(),
        };
        tracing::info!(
            added = result.added,
            modified = result.modified,
            removed = result.removed,
            unchanged = result.unchanged,
            "crawl finished"
        );
        Ok(result)
    }

    fn resolve_files(&self, patterns: &[String]) -> Vec<PathBuf> {
        let mut out = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| !is_excluded(e.path()))
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            if patterns.iter().any(|p| glob::matches(p, relative)) {
                out.push(entry.path().to_path_buf());
            }
        }
        out.sort();
        out
    }
}

fn is_excluded(path: &Path) -> bool {
    path.components().any(|c| {
        let s = c.as_os_str().to_string_lossy();
        EXCLUDED_DIRS.contains(&s.as_ref())
    })
}
