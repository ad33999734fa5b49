//! C4 — Conversation Analyzer

use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{Dialogue, Intent};
use crate::services::llm::{extract_json_object, CompletionOptions, LlmClient, ResponseFormat};

const PREFERENCE_KEYWORDS: &[(&str, &[&str])] = &[
    ("spicy", &["spicy", "hot", "pepper", "chili"]),
    ("sweet", &["sweet", "dessert", "candy", "sugar"]),
    ("healthy", &["healthy", "nutritious", "diet", "wellness"]),
    ("comfort", &["comfort", "cozy", "warm", "hearty"]),
];

const RESTRICTION_KEYWORDS: &[(&str, &[&str])] = &[
    ("vegan", &["vegan", "plant-based"]),
    ("vegetarian", &["vegetarian", "veggie"]),
    ("gluten-free", &["gluten-free", "gluten free", "celiac"]),
    ("dairy-free", &["dairy-free", "lactose", "no dairy"]),
];

const MEAL_KEYWORDS: &[(&str, &[&str])] = &[
    ("breakfast", &["breakfast", "morning", "brunch"]),
    ("lunch", &["lunch", "afternoon"]),
    ("dinner", &["dinner", "evening", "supper"]),
    ("snack", &["snack", "quick", "light"]),
];

pub struct ConversationAnalyzer {
    llm: Option<Arc<dyn LlmClient>>,
}

impl ConversationAnalyzer {
    pub fn new(llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { llm }
    }

    /// Analyzes the most recent turns of a dialogue into an `Intent`.
    /// Tries the LLM first (JSON mode); on any failure or absence of a
    /// configured LLM, falls back to the fixed keyword heuristics below.
    pub async fn analyze(&self, dialogue: &Dialogue) -> Intent {
        if let Some(llm) = &self.llm {
            let text = dialogue.last_n_text_lower(crate::models::dialogue::RELEVANT_HISTORY_LEN);
            let prompt = build_prompt(&text);
            let options = CompletionOptions {
                response_format: ResponseFormat::Json,
                ..CompletionOptions::default()
            };

            match llm.complete(&prompt, &options).await {
                Ok(raw) => match serde_json::from_str::<Intent>(extract_json_object(&raw)) {
                    Ok(intent) => return intent,
                    Err(e) => {
                        tracing::warn!("LLM analysis returned unparseable JSON, falling back to heuristics: {e}");
                    }
                },
                Err(e) => {
                    tracing::warn!("LLM analysis call failed, falling back to heuristics: {e}");
                }
            }
        }

        heuristic_analyze(dialogue)
    }
}

fn build_prompt(conversation_text: &str) -> String {
    format!(
        "Analyze the following cooking conversation and extract the user's intent as \
        JSON with fields: preferences (array of strings), restrictions (array of \
        strings), meal_context (string or null), cooking_preferences (array of \
        strings), ingredients_mentioned (array of strings), cuisine_preferences \
        (array of strings). Conversation:\n{conversation_text}"
    )
}

fn heuristic_analyze(dialogue: &Dialogue) -> Intent {
    let text = dialogue.last_n_text_lower(crate::models::dialogue::HEURISTIC_HISTORY_LEN);

    let mut preferences = HashSet::new();
    for (category, keywords) in PREFERENCE_KEYWORDS {
        if keywords.iter().any(|k| text.contains(k)) {
            preferences.insert((*category).to_string());
        }
    }

    let mut restrictions = HashSet::new();
    for (category, keywords) in RESTRICTION_KEYWORDS {
        if keywords.iter().any(|k| text.contains(k)) {
            restrictions.insert((*category).to_string());
        }
    }

    let meal_context = MEAL_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(category, _)| (*category).to_string());

    Intent {
        preferences,
        restrictions,
        meal_context,
        cooking_preferences: HashSet::new(),
        ingredients_mentioned: HashSet::new(),
        cuisine_preferences: HashSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, Role};
    use crate::services::llm::stub::StubLlmClient;

    fn dialogue_with(content: &str) -> Dialogue {
        Dialogue(vec![Message {
            role: Role::User,
            content: content.to_string(),
            timestamp: None,
        }])
    }

    #[tokio::test]
    async fn heuristic_fallback_detects_preference_restriction_and_meal_context() {
        let analyzer = ConversationAnalyzer::new(None);
        let dialogue = dialogue_with("I want something spicy and vegan for dinner");
        let intent = analyzer.analyze(&dialogue).await;

        assert!(intent.preferences.contains("spicy"));
        assert!(intent.restrictions.contains("vegan"));
        assert_eq!(intent.meal_context.as_deref(), Some("dinner"));
    }

    #[tokio::test]
    async fn meal_context_resolves_breakfast_before_later_categories() {
        let analyzer = ConversationAnalyzer::new(None);
        let dialogue = dialogue_with("brunch and dinner sound good");
        let intent = analyzer.analyze(&dialogue).await;

        assert_eq!(intent.meal_context.as_deref(), Some("breakfast"));
    }

    #[tokio::test]
    async fn falls_back_to_heuristics_when_llm_returns_garbage() {
        let llm = Arc::new(StubLlmClient::ok("not json"));
        let analyzer = ConversationAnalyzer::new(Some(llm.clone()));
        let dialogue = dialogue_with("something sweet please");
        let intent = analyzer.analyze(&dialogue).await;

        assert!(intent.preferences.contains("sweet"));
        assert_eq!(llm.calls.lock().unwrap().len(), 1);
    }
}
