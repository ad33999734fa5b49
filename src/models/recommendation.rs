//! Recommendation — a deduplicated, enriched Hit surfaced to the caller

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::hit::Hit;

/// A deduplicated Hit with optional richer metadata attached from the
/// classified-recipes catalog (spec §3, §4.6 step 6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub recipe_id: String,
    pub collection: String,
    pub similarity_score: f32,
    pub title: String,
    pub summary: String,
    pub ingredients_preview: Vec<String>,
    pub confidence: f32,
    /// Opaque, may include the original ingredients list under
    /// `original_data.ingredients` — consumed by the preference filter (C7).
    pub metadata: Map<String, Value>,
}

impl Recommendation {
    pub fn from_hit(hit: Hit, metadata: Map<String, Value>) -> Self {
        Self {
            recipe_id: hit.recipe_id,
            collection: hit.collection,
            similarity_score: hit.similarity_score,
            title: hit.title,
            summary: hit.summary,
            ingredients_preview: hit.ingredients_preview,
            confidence: hit.confidence,
            metadata,
        }
    }
}
