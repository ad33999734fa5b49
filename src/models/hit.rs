//! Hit — a single raw result from one vector search

use serde::{Deserialize, Serialize};

/// Result of one vector search against one collection for one query
/// (spec §3). Multiple Hits may share a `recipe_id` if the same recipe
/// surfaces for several queries; deduplication happens downstream in C6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    pub recipe_id: String,
    pub collection: String,
    pub similarity_score: f32,
    pub title: String,
    pub summary: String,
    pub ingredients_preview: Vec<String>,
    #[serde(default)]
    pub confidence: f32,
}
