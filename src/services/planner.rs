//! C5 — Query Planner

use std::sync::Arc;

use serde::Deserialize;

use crate::collections::COLLECTIONS;
use crate::models::{Intent, QueryPlan};
use crate::services::llm::{extract_json_object, CompletionOptions, LlmClient, ResponseFormat};

/// Per-collection fallback query pairs, used when the LLM is absent or its
/// response can't be parsed (spec §4.5 step 5), and as the base table that
/// the intent-driven customizations below override individual entries of.
fn base_queries() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        ("baked-breads", vec!["fresh bread recipes", "homemade pastries"]),
        ("quick-light", vec!["quick meal ideas", "light lunch recipes"]),
        ("protein-mains", vec!["main course dishes", "protein-rich meals"]),
        ("comfort-cooked", vec!["comfort food recipes", "hearty stews"]),
        ("desserts-sweets", vec!["sweet treats", "dessert recipes"]),
        ("breakfast-morning", vec!["breakfast ideas", "morning meals"]),
        ("plant-based", vec!["vegetarian recipes", "plant-based meals"]),
        ("fresh-cold", vec!["fresh salads", "cold dishes"]),
    ]
}

#[derive(Deserialize)]
struct LlmQueryPlanResponse {
    #[serde(default)]
    queries: std::collections::BTreeMap<String, Vec<String>>,
}

pub struct QueryPlanner {
    llm: Option<Arc<dyn LlmClient>>,
}

impl QueryPlanner {
    pub fn new(llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { llm }
    }

    /// Builds a per-collection query plan. Tries the LLM first; applies the
    /// intent-driven customization as a last-mile safety net over whatever
    /// came back (LLM success or fallback table), per spec §4.5 steps 4-5.
    pub async fn plan(&self, intent: &Intent, conversation_text: &str) -> QueryPlan {
        let mut plan = if let Some(llm) = &self.llm {
            let prompt = build_prompt(intent, conversation_text);
            let options = CompletionOptions {
                response_format: ResponseFormat::Json,
                ..CompletionOptions::default()
            };

            match llm.complete(&prompt, &options).await {
                Ok(raw) => match serde_json::from_str::<LlmQueryPlanResponse>(extract_json_object(&raw)) {
                    Ok(parsed) => {
                        let mut plan = QueryPlan::new();
                        for (collection, queries) in parsed.queries {
                            plan.insert(collection, queries);
                        }
                        fill_missing_collections(&mut plan);
                        normalize_lengths(&mut plan);
                        plan
                    }
                    Err(e) => {
                        tracing::warn!("query planner LLM response unparseable, using fallback table: {e}");
                        fallback_plan()
                    }
                },
                Err(e) => {
                    tracing::warn!("query planner LLM call failed, using fallback table: {e}");
                    fallback_plan()
                }
            }
        } else {
            fallback_plan()
        };

        apply_intent_customizations(&mut plan, intent, conversation_text);
        plan
    }
}

fn fallback_plan() -> QueryPlan {
    let mut plan = QueryPlan::new();
    for (collection, queries) in base_queries() {
        plan.insert(collection.to_string(), queries.into_iter().map(str::to_string).collect());
    }
    plan
}

/// Fills in any collection the LLM omitted from a partial response, using
/// the same fallback table entries (gap-filling, distinct from a full
/// fallback-table replacement).
fn fill_missing_collections(plan: &mut QueryPlan) {
    for (collection, queries) in base_queries() {
        if !plan.0.contains_key(collection) {
            plan.insert(collection.to_string(), queries.into_iter().map(str::to_string).collect());
        }
    }
}

/// Enforces the 1-2 query invariant per collection (spec §4.5 step 3):
/// trims anything longer than two, pads anything empty from that
/// collection's fallback pair.
fn normalize_lengths(plan: &mut QueryPlan) {
    let fallback = base_queries();
    for (collection, queries) in plan.0.iter_mut() {
        queries.truncate(2);
        if queries.is_empty() {
            if let Some((_, fallback_queries)) = fallback.iter().find(|(name, _)| name == collection) {
                queries.push(fallback_queries[0].to_string());
            }
        }
    }
}

/// Overrides specific collections' queries when the intent or raw text
/// signals a strong thematic match, pinned from the original heuristic
/// query generator (spec §4.5).
fn apply_intent_customizations(plan: &mut QueryPlan, intent: &Intent, conversation_text: &str) {
    let text_lower = conversation_text.to_lowercase();
    let wants_healthy = intent.mentions("healthy") || text_lower.contains("healthy") || text_lower.contains("diet");
    let wants_sweet = intent.mentions("sweet") || text_lower.contains("sweet") || text_lower.contains("dessert");

    if wants_healthy {
        plan.insert(
            "quick-light".to_string(),
            vec!["healthy quick meals".to_string(), "nutritious light dishes".to_string()],
        );
        plan.insert(
            "fresh-cold".to_string(),
            vec!["healthy salads".to_string(), "fresh vegetable dishes".to_string()],
        );
    }

    if wants_sweet {
        plan.insert(
            "desserts-sweets".to_string(),
            vec!["sweet desserts".to_string(), "indulgent treats".to_string()],
        );
    }
}

fn build_prompt(intent: &Intent, conversation_text: &str) -> String {
    let collection_list = COLLECTIONS
        .iter()
        .map(|c| format!("- {}: {}", c.name, c.description))
        .collect::<Vec<_>>()
        .join("\n");

    let restrictions = intent.restrictions.iter().cloned().collect::<Vec<_>>().join(", ");

    format!(
        "Given this conversation and the following recipe collections, generate two \
        search queries per collection that would surface the most relevant recipes. \
        Respect these dietary restrictions in every query (never suggest restricted \
        ingredients): {restrictions}.\n\nCollections:\n{collection_list}\n\n\
        Conversation:\n{conversation_text}\n\n\
        Respond as JSON: {{\"queries\": {{\"<collection>\": [\"query1\", \"query2\"]}}}}"
    )
}
