//! Node and Property domain models.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Content hash of a schema file's raw bytes, hex-encoded SHA-256.
///
/// `fileHash` equality implies structural equality for change detection:
/// if a node's stored hash matches the freshly computed one, the crawler
/// skips re-parsing it entirely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileHash(pub String);

impl FileHash {
    /// Hash raw file bytes.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(format!("{:x}", hasher.finalize()))
    }
}

impl fmt::Display for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of structural roles a node can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Schema,
    Service,
    Api,
    Dto,
    Enum,
}

/// A single field on a schema node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    /// Rendered type, treated as an opaque string for comparison purposes.
    /// This engine has no type system of its own, so type shifts are
    /// detected by string equality rather than structural compatibility.
    #[serde(rename = "type")]
    pub type_: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, type_: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            type_: type_.into(),
            required,
            description: None,
        }
    }
}

/// A schema node extracted from a source file.
///
/// `id` is stable across crawls as long as the schema's declared name and
/// containing file are unchanged; it is assigned by the scanner that
/// produced the node, not by the graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: NodeType,
    pub name: String,
    pub file_path: String,
    pub file_hash: FileHash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub last_modified: chrono::DateTime<chrono::Utc>,
}

impl Node {
    /// Enum value set, when `type_ == NodeType::Enum` and the scanner
    /// populated `metadata.values`. Enum changes are only considered for
    /// nodes of this type.
    pub fn enum_values(&self) -> Option<Vec<String>> {
        if self.type_ != NodeType::Enum {
            return None;
        }
        self.metadata.get("values")?.as_array().map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}
