//! Proof data model: events submitted by callers, the artifacts an epoch
//! batches them into, and the backend reference an epoch is anchored to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened to a node, as reported by a caller observing graph changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Created,
    Modified,
    Deleted,
}

/// A single change event submitted for inclusion in the next epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofEvent {
    pub node_id: String,
    pub event_type: EventType,
    pub hash: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

/// A reference to wherever an epoch's proof was ultimately recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofRef {
    pub backend: String,
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// One artifact accumulated into an epoch. The Merkle leaf hash is computed
/// over `{node_id, event_type, hash, timestamp}` only. `severity` is
/// carried for reporting but deliberately excluded from the leaf input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    pub hash: String,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl Artifact {
    pub fn from_event(event: &ProofEvent, severity: Option<String>) -> Self {
        Self {
            id: event.node_id.clone(),
            hash: event.hash.clone(),
            event_type: event.event_type,
            timestamp: event.timestamp,
            severity,
        }
    }

    /// The fields that feed the Merkle leaf hash, serialized in a fixed
    /// field order so the digest is reproducible across processes.
    fn leaf_input(&self) -> Vec<u8> {
        #[derive(Serialize)]
        struct LeafInput<'a> {
            id: &'a str,
            hash: &'a str,
            event_type: EventType,
            timestamp: DateTime<Utc>,
        }
        serde_json::to_vec(&LeafInput {
            id: &self.id,
            hash: &self.hash,
            event_type: self.event_type,
            timestamp: self.timestamp,
        })
        .expect("LeafInput always serializes")
    }

    pub fn leaf_hash(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.leaf_input());
        format!("{:x}", hasher.finalize())
    }
}

/// A finalized batch of artifacts anchored by a single Merkle root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epoch {
    pub epoch_id: u64,
    pub timestamp: DateTime<Utc>,
    pub artifacts: Vec<Artifact>,
    pub merkle_root: String,
    /// The full tree, bottom (leaves) to top (root), one `Vec<String>` of
    /// hex-encoded hashes per level. Retained locally for proof generation;
    /// never part of the submission payload sent to an external ledger.
    pub merkle_tree: Vec<Vec<String>>,
}

/// The JSON object submitted to an external ledger for a finalized epoch.
/// Only the root and per-artifact summaries cross the wire; the full tree
/// stays local.
#[derive(Debug, Clone, Serialize)]
pub struct EpochSubmissionPayload {
    pub version: &'static str,
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub epoch_id: u64,
    pub timestamp: DateTime<Utc>,
    pub merkle_root: String,
    pub artifact_count: usize,
    pub artifacts: Vec<ArtifactSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub id: String,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl From<&Epoch> for EpochSubmissionPayload {
    fn from(epoch: &Epoch) -> Self {
        Self {
            version: "1.0",
            type_: "epoch",
            epoch_id: epoch.epoch_id,
            timestamp: epoch.timestamp,
            merkle_root: epoch.merkle_root.clone(),
            artifact_count: epoch.artifacts.len(),
            artifacts: epoch
                .artifacts
                .iter()
                .map(|a| ArtifactSummary {
                    id: a.id.clone(),
                    hash: a.hash.clone(),
                    severity: a.severity.clone(),
                })
                .collect(),
        }
    }
}
