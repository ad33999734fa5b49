//! C7 — Preference Filter

use crate::models::{Preferences, Recommendation};

/// Ingredient-substring blocklists per recognized dietary restriction.
/// `vegan`'s list is pinned verbatim from the original heuristic filter;
/// the others are the same substring-blocklist mechanism applied to the
/// other values spec.md names as recognized (see DESIGN.md).
fn blocklist_for(restriction: &str) -> &'static [&'static str] {
    match restriction {
        "vegan" => &["meat", "chicken", "beef", "pork", "fish", "egg", "dairy", "milk", "cheese"],
        "vegetarian" => &["meat", "chicken", "beef", "pork", "fish"],
        "gluten-free" => &["wheat flour", "bread crumbs", "soy sauce", "barley", "all-purpose flour"],
        "dairy-free" => &["dairy", "milk", "cheese", "butter", "cream", "yogurt"],
        "nut-free" => &["peanut", "almond", "cashew", "walnut", "pecan", "hazelnut", "pistachio"],
        _ => &[],
    }
}

pub struct PreferenceFilter;

impl PreferenceFilter {
    /// Removes recommendations whose ingredients (summary, preview, or
    /// catalog `original_data.ingredients`) contain a blocked substring for
    /// any of the user's declared dietary restrictions. `preferred_cuisines`
    /// and `max_cooking_time` are accepted but never consulted (spec §4.7).
    pub fn filter(recommendations: &[Recommendation], preferences: &Preferences) -> Vec<Recommendation> {
        if preferences.dietary_restrictions.is_empty() {
            return recommendations.to_vec();
        }

        recommendations
            .iter()
            .filter(|r| !violates_any_restriction(r, &preferences.dietary_restrictions))
            .cloned()
            .collect()
    }
}

fn violates_any_restriction(recommendation: &Recommendation, restrictions: &[String]) -> bool {
    let haystack = recommendation_text(recommendation);
    restrictions.iter().any(|restriction| {
        blocklist_for(&restriction.to_lowercase())
            .iter()
            .any(|blocked| haystack.contains(blocked))
    })
}

fn recommendation_text(recommendation: &Recommendation) -> String {
    let mut text = format!(
        "{} {} {}",
        recommendation.title,
        recommendation.summary,
        recommendation.ingredients_preview.join(" ")
    );

    if let Some(original) = recommendation.metadata.get("original_data") {
        if let Some(ingredients) = original.get("ingredients").and_then(|v| v.as_array()) {
            for ingredient in ingredients {
                if let Some(s) = ingredient.as_str() {
                    text.push(' ');
                    text.push_str(s);
                }
            }
        }
    }

    text.to_lowercase()
}
