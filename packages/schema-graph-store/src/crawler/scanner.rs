//! The scanner contract: an external collaborator that turns one file's
//! bytes into nodes and edges. Actual language/API parsing is out of scope
//! for this crate. Scanners are a capability the Crawler dispatches to,
//! not something it implements.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Edge, FileHash, Node};
use crate::error::Result;

/// Output of scanning a single file.
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// A scanner turns one file's bytes (identified by path and precomputed
/// hash) into structural nodes and edges. Output must be deterministic
/// given `(file bytes, file path)`.
#[async_trait]
pub trait Scanner: Send + Sync {
    async fn scan(&self, path: &Path, hash: &FileHash) -> Result<ScanOutput>;
}

/// Dispatches files to scanners by lowercase extension. Extensions are not
/// hardcoded to a closed set; callers register whatever scanners their
/// corpus needs.
#[derive(Default, Clone)]
pub struct ScannerRegistry {
    by_extension: HashMap<String, Arc<dyn Scanner>>,
}

impl ScannerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `scanner` for a single extension (no leading dot, matched
    /// case-insensitively).
    pub fn register(&mut self, extension: &str, scanner: impl Scanner + 'static) {
        self.by_extension
            .insert(extension.to_ascii_lowercase(), Arc::new(scanner));
    }

    /// Register the same scanner for several extensions at once, the shape
    /// the default API/language split uses.
    pub fn register_shared(&mut self, extensions: &[&str], scanner: Arc<dyn Scanner>) {
        for ext in extensions {
            self.by_extension.insert(ext.to_ascii_lowercase(), scanner.clone());
        }
    }

    /// Build the default scanner split: `.json`/`.yaml`/`.yml` route to
    /// `api_scanner`, everything else this registry knows about routes to
    /// `language_scanner`. Callers still control which *other* extensions
    /// are registered for the language scanner.
    pub fn with_default_split(
        api_scanner: Arc<dyn Scanner>,
        language_scanner: Arc<dyn Scanner>,
        language_extensions: &[&str],
    ) -> Self {
        let mut registry = Self::new();
        registry.register_shared(&["json", "yaml", "yml"], api_scanner);
        registry.register_shared(language_extensions, language_scanner);
        registry
    }

    pub fn resolve(&self, path: &Path) -> Option<Arc<dyn Scanner>> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.by_extension.get(&ext).cloned()
    }
}
