//! Structured intent extracted from a dialogue by the conversation analyzer

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Structured summary of what the user wants, extracted from free-form
/// dialogue (spec §3, §4.4).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Intent {
    #[serde(default)]
    pub preferences: HashSet<String>,
    #[serde(default)]
    pub restrictions: HashSet<String>,
    #[serde(default, deserialize_with = "meal_context_from_string_or_list")]
    pub meal_context: Option<String>,
    #[serde(default)]
    pub cooking_preferences: HashSet<String>,
    #[serde(default)]
    pub ingredients_mentioned: HashSet<String>,
    #[serde(default)]
    pub cuisine_preferences: HashSet<String>,
}

/// The model is asked for a single string but sometimes emits a list
/// (e.g. `["lunch", "snack"]`); coerce that into a joined string rather
/// than failing the whole parse (spec §4.4 step 4).
fn meal_context_from_string_or_list<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
        None,
    }

    Ok(match Option::<StringOrList>::deserialize(deserializer)? {
        Some(StringOrList::One(s)) => Some(s),
        Some(StringOrList::Many(items)) => Some(items.join(", ")),
        Some(StringOrList::None) | None => None,
    })
}

impl Intent {
    /// True if any of the free-form text fields mention `keyword`, used by
    /// the query planner's last-mile fallback customization (spec §4.5 step 4).
    pub fn mentions(&self, keyword: &str) -> bool {
        self.preferences.iter().any(|p| p.eq_ignore_ascii_case(keyword))
            || self.cooking_preferences.iter().any(|p| p.eq_ignore_ascii_case(keyword))
    }
}
