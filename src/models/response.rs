//! RecommendationResponse — the public response payload (spec §4.8)

use serde::Serialize;

use super::query_plan::QueryPlan;
use super::recommendation::Recommendation;

/// Response-level provenance (spec §3).
#[derive(Debug, Clone, Serialize)]
pub struct QueryAnalysis {
    pub detected_preferences: Vec<String>,
    pub detected_restrictions: Vec<String>,
    pub meal_context: Option<String>,
    pub generated_queries: QueryPlan,
    pub collections_searched: Vec<String>,
    pub processing_time_ms: i64,
}

impl QueryAnalysis {
    pub fn empty(processing_time_ms: i64) -> Self {
        Self {
            detected_preferences: Vec::new(),
            detected_restrictions: Vec::new(),
            meal_context: None,
            generated_queries: QueryPlan::new(),
            collections_searched: Vec::new(),
            processing_time_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
    pub query_analysis: QueryAnalysis,
    /// Count after deduplication and preference filtering, before the
    /// `max_results` truncation (spec §9 Open Question, pinned in DESIGN.md).
    pub total_results: usize,
    pub status: String,
}

impl RecommendationResponse {
    pub fn error(message: impl std::fmt::Display, processing_time_ms: i64) -> Self {
        Self {
            recommendations: Vec::new(),
            query_analysis: QueryAnalysis::empty(processing_time_ms),
            total_results: 0,
            status: format!("error: {message}"),
        }
    }

    /// Best-effort response returned when the request's time budget is
    /// exceeded (spec §7: "Return partial response with `status = \"partial\"`").
    pub fn partial(processing_time_ms: i64) -> Self {
        Self {
            recommendations: Vec::new(),
            query_analysis: QueryAnalysis::empty(processing_time_ms),
            total_results: 0,
            status: "partial".to_string(),
        }
    }
}
