//! RecommendationRequest — the public request payload (spec §4.8)

use serde::Deserialize;

use super::dialogue::Dialogue;
use super::preferences::Preferences;

fn default_max_results() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub conversation_history: Dialogue,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default)]
    pub collections: Option<Vec<String>>,
    #[serde(default)]
    pub user_preferences: Option<Preferences>,
}
