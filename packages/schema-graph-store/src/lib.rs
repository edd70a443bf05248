//! Persistent dependency graph over schema files, with content-hash-keyed
//! diffing, cycle-safe traversal, and an incremental crawl protocol.
//!
//! See `domain` for the graph data model and store, and `crawler` for the
//! orchestration layer that reconciles scanner output against it.

pub mod crawler;
pub mod domain;
pub mod error;

pub use crawler::{CrawlRequest, CrawlResult, Crawler, ScanOutput, Scanner, ScannerRegistry};
pub use domain::{DownstreamEntry, Edge, EdgeType, FileHash, Graph, Node, NodeType, Property, ProvenanceEntry};
pub use error::{GraphStoreError, Result};
