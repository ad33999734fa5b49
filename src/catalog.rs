//! Loads the classified-recipes catalog at startup (spec §4.6).
//!
//! The catalog is the source of `metadata.original_data` attached to each
//! recommendation — the vector store only returns `recipe_id`, `collection`
//! and `similarity_score`; everything else is joined in from this file.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    /// Everything else in the source record, carried through verbatim into
    /// `Recommendation.metadata.original_data`.
    #[serde(flatten)]
    pub original_data: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    by_id: HashMap<String, CatalogEntry>,
}

impl Catalog {
    /// The file is a single JSON object mapping `recipe_id` to its record
    /// (spec §6.3), not an array — `recipe_id` lives only as the object key.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(path.display().to_string(), e.to_string()))?;
        let by_id: HashMap<String, CatalogEntry> = serde_json::from_str(&raw)
            .map_err(|e| CatalogError::Parse(path.display().to_string(), e.to_string()))?;

        tracing::info!(count = by_id.len(), path = %path.display(), "loaded recipe catalog");
        Ok(Self { by_id })
    }

    pub fn get(&self, recipe_id: &str) -> Option<&CatalogEntry> {
        self.by_id.get(recipe_id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[derive(Debug)]
pub enum CatalogError {
    Io(String, String),
    Parse(String, String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(path, e) => write!(f, "failed to read catalog file {path}: {e}"),
            CatalogError::Parse(path, e) => write!(f, "failed to parse catalog file {path}: {e}"),
        }
    }
}

impl std::error::Error for CatalogError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_indexes_entries_by_recipe_id() {
        let mut file = tempfile_json(
            r#"{
                "r1": {"title": "Soup", "ingredients": ["carrot"], "extra_field": 42},
                "r2": {"title": "Bread"}
            }"#,
        );
        file.flush().unwrap();

        let catalog = Catalog::load(file.path()).expect("catalog should load");
        assert_eq!(catalog.len(), 2);
        let r1 = catalog.get("r1").expect("r1 present");
        assert_eq!(r1.title.as_deref(), Some("Soup"));
        assert_eq!(r1.original_data.get("extra_field").unwrap(), 42);
        assert!(catalog.get("missing").is_none());
    }

    fn tempfile_json(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }
}
