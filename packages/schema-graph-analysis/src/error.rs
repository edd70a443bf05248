//! Error types for schema-graph-analysis.

use thiserror::Error;

/// Analysis error kinds.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A diff or drift call with no satisfiable inputs, e.g. both `old` and
    /// `new` absent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A lookup (e.g. provenance over an unknown node id) that found nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Propagated from the underlying graph store.
    #[error(transparent)]
    Store(#[from] schema_graph_store::GraphStoreError),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
