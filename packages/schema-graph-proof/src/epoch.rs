//! Epoch Manager: batches `ProofEvent`s into `Artifact`s, finalizes epochs
//! by building a Merkle tree over them, and produces/verifies inclusion
//! proofs.
//!
//! Merkle orientation: pairing at each level combines the two child hashes
//! via a canonical `sort-then-concat` rule (`SHA256(min(a,b) ‖ max(a,b))`)
//! rather than a fixed left/right order, and an odd node at a level is
//! promoted unchanged to the next level. A proof path therefore records the
//! sibling *hash* at each level (or `None` when the current node was
//! promoted with no sibling to combine), so verification never needs to
//! know which side of the pair it was on.

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::model::{Artifact, Epoch, EventType, ProofEvent};

/// A Merkle inclusion proof: one entry per tree level from leaf to root.
/// `Some(sibling_hash)` combines with the current node; `None` means the
/// current node was promoted unchanged at that level (it had no sibling).
pub type MerkleProof = Vec<Option<String>>;

fn combine(a: &str, b: &str) -> String {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Build the tree bottom-up from leaf hashes, returning every level
/// (leaves first, root last). An odd-length level promotes its final,
/// unpaired hash unchanged to the next level.
fn build_tree(leaves: Vec<String>) -> Vec<Vec<String>> {
    let mut levels = vec![leaves];
    while levels.last().unwrap().len() > 1 {
        let current = levels.last().unwrap();
        let mut next = Vec::with_capacity(current.len().div_ceil(2));
        let mut i = 0;
        while i < current.len() {
            if i + 1 < current.len() {
                next.push(combine(&current[i], &current[i + 1]));
            } else {
                next.push(current[i].clone());
            }
            i += 2;
        }
        levels.push(next);
    }
    levels
}

/// Accumulates proof events into artifacts and finalizes them into
/// Merkle-batched epochs. Single-threaded cooperative: callers must not
/// overlap `add_artifact`/`finalize_epoch` calls concurrently.
#[derive(Debug, Default)]
pub struct EpochManager {
    current: Vec<Artifact>,
    epoch_counter: u64,
    /// Advisory finalization interval; the manager does not schedule
    /// finalization itself; callers trigger it externally.
    interval_ms: u64,
}

impl EpochManager {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            current: Vec::new(),
            epoch_counter: 0,
            interval_ms,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn epoch_counter(&self) -> u64 {
        self.epoch_counter
    }

    pub fn pending_count(&self) -> usize {
        self.current.len()
    }

    /// Append one proof event as an artifact awaiting the next epoch.
    pub fn add_artifact(&mut self, event: ProofEvent, severity: Option<String>) {
        self.current.push(Artifact::from_event(&event, severity));
    }

    /// Finalize the current buffer into an epoch. Returns `None` if no
    /// artifacts are pending. Takes a swap-snapshot of `current` before
    /// building the tree, so an `add_artifact` call racing a caller's
    /// `finalize_epoch` call (the core is single-threaded cooperative, so
    /// this can only happen across two distinct calls, never mid-call) is
    /// simply invisible to this epoch and lands in the next one.
    pub fn finalize_epoch(&mut self) -> Option<Epoch> {
        if self.current.is_empty() {
            return None;
        }
        let artifacts = std::mem::take(&mut self.current);
        self.epoch_counter += 1;

        let leaves: Vec<String> = artifacts.iter().map(Artifact::leaf_hash).collect();
        let tree = build_tree(leaves);
        let merkle_root = tree.last().unwrap()[0].clone();

        let epoch = Epoch {
            epoch_id: self.epoch_counter,
            timestamp: Utc::now(),
            artifacts,
            merkle_root,
            merkle_tree: tree,
        };
        tracing::info!(
            epoch_id = epoch.epoch_id,
            artifacts = epoch.artifacts.len(),
            merkle_root = %epoch.merkle_root,
            "epoch finalized"
        );
        Some(epoch)
    }

    /// Generate a Merkle inclusion proof for `artifact` within `epoch`,
    /// located by `(id, hash)`. Returns `None` if no matching artifact is
    /// present.
    pub fn generate_merkle_proof(artifact: &Artifact, epoch: &Epoch) -> Option<MerkleProof> {
        let mut index = epoch
            .artifacts
            .iter()
            .position(|a| a.id == artifact.id && a.hash == artifact.hash)?;

        let mut proof = Vec::new();
        for level in &epoch.merkle_tree[..epoch.merkle_tree.len().saturating_sub(1)] {
            let sibling_index = if index % 2 == 0 { index + 1 } else { index - 1 };
            proof.push(level.get(sibling_index).cloned());
            index /= 2;
        }
        Some(proof)
    }

    /// Verify that `artifact` is included in `epoch`, given a proof path
    /// from [`generate_merkle_proof`].
    pub fn verify_artifact_in_epoch(artifact: &Artifact, epoch: &Epoch, proof: &MerkleProof) -> bool {
        let mut computed = artifact.leaf_hash();
        for sibling in proof {
            computed = match sibling {
                Some(sibling_hash) => combine(&computed, sibling_hash),
                None => computed,
            };
        }
        computed == epoch.merkle_root
    }
}
