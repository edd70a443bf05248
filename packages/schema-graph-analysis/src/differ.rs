//! Pairwise and batch structural diff between node versions, with
//! breaking-change classification.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use schema_graph_store::{Node, NodeType};

use crate::error::{AnalysisError, Result};
use crate::severity::{compatibility_summary, Severity};

/// The net effect of comparing one node's old and new version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
    Unchanged,
}

/// The kind of a single field-level (or node-level) change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    FieldRemoved,
    FieldAdded,
    FieldTypeChanged,
    FieldRequiredChanged,
    IntentChanged,
    EnumValueChanged,
}

/// One detected change between an old and new node version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    /// Property or enum value name the change is about, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    pub breaking: bool,
}

/// Structural diff between one node's old and new version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDiff {
    pub node_id: String,
    pub change_type: ChangeType,
    pub changes: Vec<Change>,
    /// True iff any change is breaking, or `change_type == Removed`.
    pub breaking: bool,
}

/// Diff one node's old and new version. Exactly one of `old`/`new` may be
/// `None` (added/removed); both `None` is an invalid call.
pub fn diff(old: Option<&Node>, new: Option<&Node>) -> Result<SchemaDiff> {
    match (old, new) {
        (None, None) => Err(AnalysisError::InvalidInput(
            "diff requires at least one of old/new to be present".to_string(),
        )),
        (None, Some(new)) => Ok(SchemaDiff {
            node_id: new.id.clone(),
            change_type: ChangeType::Added,
            changes: Vec::new(),
            breaking: false,
        }),
        (Some(old), None) => Ok(SchemaDiff {
            node_id: old.id.clone(),
            change_type: ChangeType::Removed,
            changes: Vec::new(),
            breaking: true,
        }),
        (Some(old), Some(new)) => Ok(diff_present(old, new)),
    }
}

fn diff_present(old: &Node, new: &Node) -> SchemaDiff {
    if old.file_hash == new.file_hash {
        return SchemaDiff {
            node_id: new.id.clone(),
            change_type: ChangeType::Unchanged,
            changes: Vec::new(),
            breaking: false,
        };
    }

    let mut changes = Vec::new();
    diff_properties(old, new, &mut changes);
    diff_intent(old, new, &mut changes);
    diff_enum_values(old, new, &mut changes);

    let breaking = changes.iter().any(|c| c.breaking);
    SchemaDiff {
        node_id: new.id.clone(),
        change_type: ChangeType::Modified,
        changes,
        breaking,
    }
}

fn diff_properties(old: &Node, new: &Node, changes: &mut Vec<Change>) {
    for old_prop in &old.properties {
        match new.property(&old_prop.name) {
            None => changes.push(Change {
                kind: ChangeKind::FieldRemoved,
                field: Some(old_prop.name.clone()),
                old_value: Some(old_prop.type_.clone()),
                new_value: None,
                breaking: true,
            }),
            Some(new_prop) => {
                if old_prop.type_ != new_prop.type_ {
                    changes.push(Change {
                        kind: ChangeKind::FieldTypeChanged,
                        field: Some(old_prop.name.clone()),
                        old_value: Some(old_prop.type_.clone()),
                        new_value: Some(new_prop.type_.clone()),
                        breaking: true,
                    });
                }
                if old_prop.required != new_prop.required {
                    changes.push(Change {
                        kind: ChangeKind::FieldRequiredChanged,
                        field: Some(old_prop.name.clone()),
                        old_value: Some(old_prop.required.to_string()),
                        new_value: Some(new_prop.required.to_string()),
                        // Required narrowing (optional -> required) breaks
                        // consumers; widening (required -> optional) does not.
                        breaking: new_prop.required,
                    });
                }
            }
        }
    }

    for new_prop in &new.properties {
        if old.property(&new_prop.name).is_none() {
            changes.push(Change {
                kind: ChangeKind::FieldAdded,
                field: Some(new_prop.name.clone()),
                old_value: None,
                new_value: Some(new_prop.type_.clone()),
                breaking: new_prop.required,
            });
        }
    }
}

fn diff_intent(old: &Node, new: &Node, changes: &mut Vec<Change>) {
    if old.intent != new.intent {
        changes.push(Change {
            kind: ChangeKind::IntentChanged,
            field: None,
            old_value: old.intent.clone(),
            new_value: new.intent.clone(),
            breaking: false,
        });
    }
}

fn diff_enum_values(old: &Node, new: &Node, changes: &mut Vec<Change>) {
    if old.type_ != NodeType::Enum || new.type_ != NodeType::Enum {
        return;
    }
    let old_values = old.enum_values().unwrap_or_default();
    let new_values = new.enum_values().unwrap_or_default();

    for value in &old_values {
        if !new_values.contains(value) {
            changes.push(Change {
                kind: ChangeKind::EnumValueChanged,
                field: Some(value.clone()),
                old_value: Some(value.clone()),
                new_value: None,
                breaking: true,
            });
        }
    }
    for value in &new_values {
        if !old_values.contains(value) {
            changes.push(Change {
                kind: ChangeKind::EnumValueChanged,
                field: Some(value.clone()),
                old_value: None,
                new_value: Some(value.clone()),
                breaking: false,
            });
        }
    }
}

/// Diff every id in the union of `old_map`/`new_map`, keeping only entries
/// whose change type is not `Unchanged`.
pub fn diff_many(old_map: &HashMap<String, Node>, new_map: &HashMap<String, Node>) -> Vec<SchemaDiff> {
    let mut ids: Vec<&String> = old_map.keys().chain(new_map.keys()).collect();
    ids.sort();
    ids.dedup();

    let diffs: Vec<SchemaDiff> = ids
        .into_iter()
        .filter_map(|id| {
            let result = diff(old_map.get(id), new_map.get(id)).ok()?;
            (result.change_type != ChangeType::Unchanged).then_some(result)
        })
        .collect();

    let (severity, _) = diff_summary(&diffs);
    tracing::debug!(total = diffs.len(), ?severity, "batch diff complete");
    diffs
}

/// Render a batch of `SchemaDiff`s as a compatibility-check summary: a
/// single affirmative line when `diffs` is empty, otherwise a severity
/// reflecting whether any diff is breaking.
pub fn diff_summary(diffs: &[SchemaDiff]) -> (Severity, String) {
    let breaking_count = diffs.iter().filter(|d| d.breaking).count();
    compatibility_summary(breaking_count, diffs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema_graph_store::{FileHash, Property};

    fn base_user() -> Node {
        Node {
            id: "User".to_string(),
            type_: NodeType::Schema,
            name: "User".to_string(),
            file_path: "user.ts".to_string(),
            file_hash: FileHash("h1".to_string()),
            intent: None,
            properties: vec![
                Property::new("id", "string", true),
                Property::new("email", "string", true),
                Property::new("displayName", "string", true),
                Property::new("createdAt", "Date", true),
            ],
            metadata: serde_json::Map::new(),
            last_modified: chrono::Utc::now(),
        }
    }

    #[test]
    fn both_absent_is_invalid_input() {
        assert!(matches!(diff(None, None), Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn add_optional_field_is_non_breaking() {
        let old = base_user();
        let mut new = old.clone();
        new.file_hash = FileHash("h2".to_string());
        new.properties.push(Property::new("preferences", "object", false));

        let result = diff(Some(&old), Some(&new)).unwrap();
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].kind, ChangeKind::FieldAdded);
        assert!(!result.changes[0].breaking);
        assert!(!result.breaking);
    }

    #[test]
    fn remove_required_field_is_breaking() {
        let mut old = base_user();
        old.id = "Payment".to_string();
        old.properties.push(Property::new("transactionId", "string", true));
        let mut new = old.clone();
        new.file_hash = FileHash("h2".to_string());
        new.properties.retain(|p| p.name != "transactionId");

        let result = diff(Some(&old), Some(&new)).unwrap();
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].kind, ChangeKind::FieldRemoved);
        assert!(result.breaking);
    }

    #[test]
    fn type_narrowing_is_breaking() {
        let mut old = base_user();
        old.properties = vec![Property::new("timestamp", "Date", true)];
        let mut new = old.clone();
        new.file_hash = FileHash("h2".to_string());
        new.properties = vec![Property::new("timestamp", "string", true)];

        let result = diff(Some(&old), Some(&new)).unwrap();
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].kind, ChangeKind::FieldTypeChanged);
        assert!(result.breaking);
    }

    #[test]
    fn enum_value_removal_is_breaking_addition_is_not() {
        let mut old = base_user();
        old.type_ = NodeType::Enum;
        old.properties = vec![];
        old.metadata
            .insert("values".to_string(), serde_json::json!(["pending", "completed"]));
        let mut new = old.clone();
        new.file_hash = FileHash("h2".to_string());
        new.metadata
            .insert("values".to_string(), serde_json::json!(["pending"]));

        let result = diff(Some(&old), Some(&new)).unwrap();
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].kind, ChangeKind::EnumValueChanged);
        assert!(result.breaking);
    }

    #[test]
    fn required_narrowing_is_breaking_widening_is_not() {
        let mut old = base_user();
        old.properties = vec![Property::new("preferences", "object", false)];
        let mut narrowed = old.clone();
        narrowed.file_hash = FileHash("h2".to_string());
        narrowed.properties = vec![Property::new("preferences", "object", true)];

        let result = diff(Some(&old), Some(&narrowed)).unwrap();
        assert!(result.breaking);

        let mut widened = old.clone();
        widened.properties = vec![Property::new("preferences", "object", true)];
        let mut widened_new = widened.clone();
        widened_new.file_hash = FileHash("h3".to_string());
        widened_new.properties = vec![Property::new("preferences", "object", false)];

        let result = diff(Some(&widened), Some(&widened_new)).unwrap();
        assert!(!result.breaking);
    }

    #[test]
    fn unchanged_hash_short_circuits_with_no_changes() {
        let old = base_user();
        let new = old.clone();
        let result = diff(Some(&old), Some(&new)).unwrap();
        assert_eq!(result.change_type, ChangeType::Unchanged);
        assert!(result.changes.is_empty());
        assert!(!result.breaking);
    }

    #[test]
    fn removed_node_is_always_breaking() {
        let old = base_user();
        let result = diff(Some(&old), None).unwrap();
        assert_eq!(result.change_type, ChangeType::Removed);
        assert!(result.breaking);
    }

    #[test]
    fn diff_many_drops_unchanged_entries() {
        let old = base_user();
        let mut old_map = HashMap::new();
        old_map.insert(old.id.clone(), old.clone());

        let mut new_map = old_map.clone();
        // User: unchanged. Payment: added.
        let mut payment = base_user();
        payment.id = "Payment".to_string();
        new_map.insert(payment.id.clone(), payment);

        let diffs = diff_many(&old_map, &new_map);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].node_id, "Payment");
        assert_eq!(diffs[0].change_type, ChangeType::Added);
    }

    #[test]
    fn diff_summary_is_affirmative_when_empty() {
        let (severity, text) = diff_summary(&[]);
        assert_eq!(severity, Severity::Info);
        assert_eq!(text, "no issues found");
    }

    #[test]
    fn diff_summary_is_breaking_when_any_diff_is_breaking() {
        let mut old = base_user();
        old.id = "Payment".to_string();
        old.properties.push(Property::new("transactionId", "string", true));
        let mut new = old.clone();
        new.file_hash = FileHash("h2".to_string());
        new.properties.retain(|p| p.name != "transactionId");
        let removal = diff(Some(&old), Some(&new)).unwrap();

        let (severity, _) = diff_summary(&[removal]);
        assert_eq!(severity, Severity::Breaking);
    }
}
