//! Error types for schema-graph-store

use thiserror::Error;

/// Graph store error kinds.
#[derive(Debug, Error)]
pub enum GraphStoreError {
    /// Diff/traversal called with inputs that cannot be satisfied (e.g. an
    /// id that does not appear in the graph at all).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Requested node or edge id is not present in the graph.
    #[error("not found: {0}")]
    NotFound(String),

    /// Filesystem I/O failure while reading a schema file or the persisted
    /// graph. Corrupt-state failures on *load* are recovered locally instead
    /// (see `GraphStore::load`); this variant is for everything else,
    /// including save failures, which must surface to the caller.
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted graph file exists but could not be parsed.
    #[error("corrupt graph state: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphStoreError>;
