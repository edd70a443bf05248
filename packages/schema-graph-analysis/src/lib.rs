//! Structural schema diffing, breaking-change classification, intent-drift
//! scoring, and impact/provenance report building over a `schema_graph_store::Graph`.

pub mod differ;
pub mod drift;
pub mod error;
pub mod impact;
pub mod severity;

pub use differ::{diff, diff_many, diff_summary, Change, ChangeKind, ChangeType, SchemaDiff};
pub use drift::{detect_drift, detect_drift_many, Drift};
pub use error::{AnalysisError, Result};
pub use impact::{
    build_impact_report, build_provenance_report, ImpactReport, ProvenanceReport, ProvenanceStep,
    PLACEHOLDER_PROVENANCE_CONFIDENCE,
};
pub use severity::{compatibility_summary, DriftSeverity, Severity};
