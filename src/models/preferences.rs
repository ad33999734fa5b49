//! User preferences consulted by the preference filter (C7)

use serde::{Deserialize, Serialize};

/// Preferences schema recognized by the preference filter (spec §4.7).
/// `preferred_cuisines` and `max_cooking_time` are accepted but currently
/// no-ops, reserved for when richer recipe metadata is available.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub preferred_cuisines: Vec<String>,
    #[serde(default)]
    pub max_cooking_time: Option<i32>,
}
