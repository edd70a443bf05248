//! Intent-drift scorer: weighted textual similarity between an old and new
//! intent string, with severity bucketing.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use schema_graph_store::Node;

use crate::severity::{DriftSeverity, Severity};

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w]+").unwrap());

const JACCARD_WEIGHT: f64 = 0.4;
const COSINE_WEIGHT: f64 = 0.4;
const EDIT_WEIGHT: f64 = 0.2;

/// Intent-drift result for a single node's old and new intent string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drift {
    pub node_id: String,
    pub jaccard: f64,
    pub cosine: f64,
    pub edit: f64,
    pub composite: f64,
    pub severity: DriftSeverity,
}

/// Lowercase, strip non-word characters to whitespace, split on whitespace,
/// and drop empty tokens.
fn tokenize(text: &str) -> Vec<String> {
    NON_WORD
        .replace_all(&text.to_lowercase(), " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn jaccard_similarity(tokens_a: &[String], tokens_b: &[String]) -> f64 {
    let set_a: HashSet<&String> = tokens_a.iter().collect();
    let set_b: HashSet<&String> = tokens_b.iter().collect();
    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

fn cosine_similarity(tokens_a: &[String], tokens_b: &[String]) -> f64 {
    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 1.0;
    }

    let mut vocab: HashMap<&str, usize> = HashMap::new();
    for token in tokens_a.iter().chain(tokens_b.iter()) {
        let next_index = vocab.len();
        vocab.entry(token.as_str()).or_insert(next_index);
    }

    let mut vec_a = vec![0.0_f64; vocab.len()];
    let mut vec_b = vec![0.0_f64; vocab.len()];
    for token in tokens_a {
        vec_a[vocab[token.as_str()]] += 1.0;
    }
    for token in tokens_b {
        vec_b[vocab[token.as_str()]] += 1.0;
    }

    let dot: f64 = vec_a.iter().zip(vec_b.iter()).map(|(a, b)| a * b).sum();
    let norm_a = vec_a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = vec_b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Classical Levenshtein distance, insert/delete/substitute cost 1.
fn levenshtein_distance(a: &[char], b: &[char]) -> usize {
    let (len_a, len_b) = (a.len(), b.len());
    if len_a == 0 {
        return len_b;
    }
    if len_b == 0 {
        return len_a;
    }

    let mut prev: Vec<usize> = (0..=len_b).collect();
    let mut curr = vec![0usize; len_b + 1];

    for i in 1..=len_a {
        curr[0] = i;
        for j in 1..=len_b {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (curr[j - 1] + 1).min(prev[j] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[len_b]
}

fn edit_similarity(a: &str, b: &str) -> f64 {
    let a_lower: Vec<char> = a.to_lowercase().chars().collect();
    let b_lower: Vec<char> = b.to_lowercase().chars().collect();
    let max_len = a_lower.len().max(b_lower.len());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein_distance(&a_lower, &b_lower);
    1.0 - (distance as f64 / max_len as f64)
}

fn intent_of(node: Option<&Node>) -> String {
    node.and_then(|n| n.intent.clone()).unwrap_or_default()
}

/// Score intent drift between `old` and `new`. Returns `None` when both
/// nodes are absent, or when the intent strings are identical.
pub fn detect_drift(node_id: impl Into<String>, old: Option<&Node>, new: Option<&Node>) -> Option<Drift> {
    if old.is_none() && new.is_none() {
        return None;
    }
    let old_intent = intent_of(old);
    let new_intent = intent_of(new);
    if old_intent == new_intent {
        return None;
    }

    let tokens_a = tokenize(&old_intent);
    let tokens_b = tokenize(&new_intent);

    let jaccard = jaccard_similarity(&tokens_a, &tokens_b);
    let cosine = cosine_similarity(&tokens_a, &tokens_b);
    let edit = edit_similarity(&old_intent, &new_intent);
    let composite = JACCARD_WEIGHT * jaccard + COSINE_WEIGHT * cosine + EDIT_WEIGHT * edit;

    Some(Drift {
        node_id: node_id.into(),
        jaccard,
        cosine,
        edit,
        composite,
        severity: Severity::from_drift_score(composite),
    })
}

/// Score drift across the union of ids in `old_map`/`new_map`, returning
/// non-null drifts sorted ascending by composite score (most-drifted first).
pub fn detect_drift_many(
    old_map: &HashMap<String, Node>,
    new_map: &HashMap<String, Node>,
) -> Vec<Drift> {
    let mut ids: Vec<&String> = old_map.keys().chain(new_map.keys()).collect();
    ids.sort();
    ids.dedup();

    let mut drifts: Vec<Drift> = ids
        .into_iter()
        .filter_map(|id| detect_drift(id.clone(), old_map.get(id), new_map.get(id)))
        .collect();
    drifts.sort_by(|a, b| a.composite.partial_cmp(&b.composite).unwrap());
    tracing::debug!(count = drifts.len(), "batch drift scoring complete");
    drifts
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema_graph_store::{FileHash, NodeType};

    fn node_with_intent(intent: Option<&str>) -> Node {
        Node {
            id: "User".to_string(),
            type_: NodeType::Schema,
            name: "User".to_string(),
            file_path: "user.ts".to_string(),
            file_hash: FileHash("h".to_string()),
            intent: intent.map(str::to_string),
            properties: vec![],
            metadata: serde_json::Map::new(),
            last_modified: chrono::Utc::now(),
        }
    }

    #[test]
    fn identical_intent_yields_no_drift() {
        let a = node_with_intent(Some("track user activity"));
        let b = a.clone();
        assert!(detect_drift("User", Some(&a), Some(&b)).is_none());
    }

    #[test]
    fn both_absent_yields_no_drift() {
        assert!(detect_drift("User", None, None).is_none());
    }

    #[test]
    fn component_scores_are_bounded() {
        let a = node_with_intent(Some("Add lastLoginAt for security monitoring"));
        let b = node_with_intent(Some("Track user activity for analytics"));
        let drift = detect_drift("User", Some(&a), Some(&b)).unwrap();
        for score in [drift.jaccard, drift.cosine, drift.edit, drift.composite] {
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn intent_rewrite_scores_high_severity() {
        let a = node_with_intent(Some("Add lastLoginAt for security monitoring"));
        let b = node_with_intent(Some("Track user activity for analytics"));
        let drift = detect_drift("User", Some(&a), Some(&b)).unwrap();
        assert!(drift.composite < 0.4);
        assert_eq!(drift.severity, DriftSeverity::High);
    }

    #[test]
    fn swapping_old_and_new_preserves_composite_score() {
        let a = node_with_intent(Some("Add lastLoginAt for security monitoring"));
        let b = node_with_intent(Some("Track user activity for analytics"));
        let forward = detect_drift("User", Some(&a), Some(&b)).unwrap();
        let backward = detect_drift("User", Some(&b), Some(&a)).unwrap();
        assert!((forward.composite - backward.composite).abs() < 1e-12);
    }

    #[test]
    fn missing_intent_on_either_side_is_high_severity() {
        let a = node_with_intent(None);
        let b = node_with_intent(Some("something entirely new"));
        let drift = detect_drift("User", Some(&a), Some(&b)).unwrap();
        assert_eq!(drift.severity, DriftSeverity::High);
    }

    #[test]
    fn detect_drift_many_sorts_most_drifted_first() {
        let mut old_map = HashMap::new();
        let mut new_map = HashMap::new();

        let mut stable_old = node_with_intent(Some("manage users"));
        stable_old.id = "Stable".to_string();
        let mut stable_new = stable_old.clone();
        stable_new.intent = Some("manage users and roles".to_string());

        let mut rewritten_old = node_with_intent(Some("Add lastLoginAt for security monitoring"));
        rewritten_old.id = "Rewritten".to_string();
        let mut rewritten_new = rewritten_old.clone();
        rewritten_new.intent = Some("Track user activity for analytics".to_string());

        old_map.insert(stable_old.id.clone(), stable_old);
        old_map.insert(rewritten_old.id.clone(), rewritten_old);
        new_map.insert(stable_new.id.clone(), stable_new);
        new_map.insert(rewritten_new.id.clone(), rewritten_new);

        let drifts = detect_drift_many(&old_map, &new_map);
        assert_eq!(drifts.len(), 2);
        assert_eq!(drifts[0].node_id, "Rewritten");
        assert_eq!(drifts[1].node_id, "Stable");
    }
}
