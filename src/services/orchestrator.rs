//! C8 — Recommendation Orchestrator

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::catalog::Catalog;
use crate::collections::all_names;
use crate::errors::AppError;
use crate::models::{QueryAnalysis, RecommendationRequest, RecommendationResponse};
use crate::services::analyzer::ConversationAnalyzer;
use crate::services::embedding::EmbeddingProvider;
use crate::services::llm::LlmClient;
use crate::services::planner::QueryPlanner;
use crate::services::preference_filter::PreferenceFilter;
use crate::services::search::SearchExecutor;
use crate::services::vector_store::VectorStoreClient;

pub struct RecommendationOrchestrator {
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStoreClient>,
    llm: Option<Arc<dyn LlmClient>>,
    catalog: Arc<Catalog>,
    max_parallel_searches: usize,
    request_timeout_ms: u64,
}

impl RecommendationOrchestrator {
    /// Fails fast if the embedding provider or the vector store's eight
    /// collections are unreachable; starts in heuristic-only mode (LLM:
    /// None) with a warning if `llm` is absent, since that's a recoverable
    /// degradation rather than a hard dependency (spec §4.8, §6.2).
    pub async fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStoreClient>,
        llm: Option<Arc<dyn LlmClient>>,
        catalog: Arc<Catalog>,
        max_parallel_searches: usize,
        request_timeout_ms: u64,
    ) -> Result<Self, AppError> {
        embedder.embed("startup connectivity probe").await?;

        for name in all_names() {
            if !vector_store.collection_exists(&name).await? {
                return Err(AppError::CollectionMissing(name));
            }
        }

        if llm.is_none() {
            tracing::warn!("LLM_API_KEY not set — starting in heuristic-only mode");
        }

        Ok(Self {
            embedder,
            vector_store,
            llm,
            catalog,
            max_parallel_searches,
            request_timeout_ms,
        })
    }

    /// Runs the full pipeline (spec §4.8 steps 1-8). Never returns a hard
    /// error for a transient AI failure — C4/C5 already degrade internally,
    /// and a per-request timeout yields the best-effort partial response
    /// assembled so far rather than propagating an error.
    pub async fn recommend(&self, request: RecommendationRequest) -> RecommendationResponse {
        let start = Instant::now();

        if request.conversation_history.is_empty() {
            return RecommendationResponse::error(
                "conversation_history must not be empty",
                elapsed_ms(start),
            );
        }

        if request.max_results == 0 || request.max_results > 50 {
            return RecommendationResponse::error(
                "max_results must be between 1 and 50",
                elapsed_ms(start),
            );
        }

        let budget = Duration::from_millis(self.request_timeout_ms);
        match tokio::time::timeout(budget, self.recommend_inner(request, start)).await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!("request exceeded its time budget, returning partial response");
                RecommendationResponse::partial(elapsed_ms(start))
            }
        }
    }

    async fn recommend_inner(&self, request: RecommendationRequest, start: Instant) -> RecommendationResponse {
        let analyzer = ConversationAnalyzer::new(self.llm.clone());
        let planner = QueryPlanner::new(self.llm.clone());
        let search_executor = SearchExecutor::new(
            self.embedder.clone(),
            self.vector_store.clone(),
            self.catalog.clone(),
            self.max_parallel_searches,
        );

        // Step 1-2: analyze the conversation into a structured intent.
        let intent = analyzer.analyze(&request.conversation_history).await;

        // Step 3: plan per-collection queries.
        let conversation_text = request.conversation_history.last_n_text_lower(
            crate::models::dialogue::RELEVANT_HISTORY_LEN,
        );
        let mut plan = planner.plan(&intent, &conversation_text).await;

        // Step 4: restrict to the caller's requested collections, if given.
        if let Some(requested) = &request.collections {
            plan = plan.restrict_to(requested);
        }
        let collections_searched = plan.collections();

        // Step 5: fan out searches across the plan.
        let hits = search_executor.search(&plan).await;

        // Step 6: apply the user's dietary preference filter, if given.
        let filtered = match &request.user_preferences {
            Some(preferences) => PreferenceFilter::filter(&hits, preferences),
            None => hits,
        };

        // total_results is taken after dedup+filter, before max_results
        // truncation (spec §9 Open Question, pinned in DESIGN.md).
        let total_results = filtered.len();

        // Step 7: truncate to the caller's requested page size.
        let mut recommendations = filtered;
        recommendations.truncate(request.max_results);

        let query_analysis = QueryAnalysis {
            detected_preferences: intent.preferences.into_iter().collect(),
            detected_restrictions: intent.restrictions.into_iter().collect(),
            meal_context: intent.meal_context,
            generated_queries: plan,
            collections_searched,
            processing_time_ms: elapsed_ms(start),
        };

        // Step 8: assemble the response.
        RecommendationResponse {
            recommendations,
            query_analysis,
            total_results,
            status: "success".to_string(),
        }
    }
}

fn elapsed_ms(start: Instant) -> i64 {
    start.elapsed().as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dialogue, Message, Preferences, RecommendationRequest, Role};
    use crate::services::embedding::stub::StubEmbeddingProvider;
    use crate::services::llm::stub::StubLlmClient;
    use crate::services::vector_store::stub::StubVectorStoreClient;
    use std::collections::HashMap;

    fn all_collections_known() -> Vec<String> {
        all_names()
    }

    fn hit(id: &str, collection: &str, score: f32) -> crate::models::Hit {
        crate::models::Hit {
            recipe_id: id.to_string(),
            collection: collection.to_string(),
            similarity_score: score,
            title: format!("title-{id}"),
            summary: String::new(),
            ingredients_preview: Vec::new(),
            confidence: score,
        }
    }

    fn dialogue(content: &str) -> Dialogue {
        Dialogue(vec![Message {
            role: Role::User,
            content: content.to_string(),
            timestamp: None,
        }])
    }

    async fn build_orchestrator(
        hits_by_collection: HashMap<String, Vec<crate::models::Hit>>,
        llm: Option<Arc<dyn LlmClient>>,
    ) -> RecommendationOrchestrator {
        let embedder = Arc::new(StubEmbeddingProvider::ok(vec![0.1; 768]));
        let vector_store = Arc::new(StubVectorStoreClient::new(hits_by_collection, all_collections_known()));
        let catalog = Arc::new(Catalog::default());

        RecommendationOrchestrator::new(embedder, vector_store, llm, catalog, 4, 30_000)
            .await
            .expect("orchestrator should start")
    }

    #[tokio::test]
    async fn rejects_empty_conversation_history() {
        let orchestrator = build_orchestrator(HashMap::new(), None).await;
        let request = RecommendationRequest {
            conversation_history: Dialogue(Vec::new()),
            max_results: 10,
            collections: None,
            user_preferences: None,
        };

        let response = orchestrator.recommend(request).await;
        assert!(response.status.starts_with("error"));
        assert_eq!(response.total_results, 0);
    }

    #[tokio::test]
    async fn happy_path_returns_deduplicated_truncated_results() {
        let mut hits_by_collection = HashMap::new();
        hits_by_collection.insert(
            "quick-light".to_string(),
            vec![hit("r1", "quick-light", 0.9), hit("r2", "quick-light", 0.8)],
        );
        let orchestrator = build_orchestrator(hits_by_collection, None).await;

        let request = RecommendationRequest {
            conversation_history: dialogue("something quick for lunch"),
            max_results: 1,
            collections: Some(vec!["quick-light".to_string()]),
            user_preferences: None,
        };

        let response = orchestrator.recommend(request).await;
        assert_eq!(response.status, "success");
        assert_eq!(response.total_results, 2);
        assert_eq!(response.recommendations.len(), 1);
        assert_eq!(response.recommendations[0].recipe_id, "r1");
        assert_eq!(response.query_analysis.collections_searched, vec!["quick-light".to_string()]);
    }

    #[tokio::test]
    async fn rejects_max_results_out_of_range() {
        let orchestrator = build_orchestrator(HashMap::new(), None).await;

        let too_many = RecommendationRequest {
            conversation_history: dialogue("anything"),
            max_results: 51,
            collections: None,
            user_preferences: None,
        };
        let response = orchestrator.recommend(too_many).await;
        assert!(response.status.starts_with("error"));

        let zero = RecommendationRequest {
            conversation_history: dialogue("anything"),
            max_results: 0,
            collections: None,
            user_preferences: None,
        };
        let response = orchestrator.recommend(zero).await;
        assert!(response.status.starts_with("error"));
    }

    #[tokio::test]
    async fn collections_filter_restricts_searched_set() {
        let mut hits_by_collection = HashMap::new();
        hits_by_collection.insert("quick-light".to_string(), vec![hit("r1", "quick-light", 0.9)]);
        hits_by_collection.insert("desserts-sweets".to_string(), vec![hit("r2", "desserts-sweets", 0.95)]);
        let orchestrator = build_orchestrator(hits_by_collection, None).await;

        let request = RecommendationRequest {
            conversation_history: dialogue("anything goes"),
            max_results: 10,
            collections: Some(vec!["quick-light".to_string()]),
            user_preferences: None,
        };

        let response = orchestrator.recommend(request).await;
        assert_eq!(response.recommendations.len(), 1);
        assert_eq!(response.recommendations[0].recipe_id, "r1");
    }

    #[tokio::test]
    async fn llm_absent_still_produces_a_full_response() {
        let mut hits_by_collection = HashMap::new();
        hits_by_collection.insert("desserts-sweets".to_string(), vec![hit("r1", "desserts-sweets", 0.9)]);
        let orchestrator = build_orchestrator(hits_by_collection, None).await;

        let request = RecommendationRequest {
            conversation_history: dialogue("I want something sweet"),
            max_results: 10,
            collections: None,
            user_preferences: None,
        };

        let response = orchestrator.recommend(request).await;
        assert_eq!(response.status, "success");
        assert!(response.query_analysis.detected_preferences.contains(&"sweet".to_string()));
    }

    #[tokio::test]
    async fn preferences_filter_is_applied_before_total_results_is_captured() {
        let mut hits_by_collection = HashMap::new();
        hits_by_collection.insert(
            "protein-mains".to_string(),
            vec![hit("r1", "protein-mains", 0.9), hit("r2", "protein-mains", 0.8)],
        );
        let orchestrator = build_orchestrator(hits_by_collection, None).await;

        let mut request = RecommendationRequest {
            conversation_history: dialogue("protein please"),
            max_results: 10,
            collections: Some(vec!["protein-mains".to_string()]),
            user_preferences: Some(Preferences {
                dietary_restrictions: vec!["vegan".to_string()],
                ..Preferences::default()
            }),
        };
        request.collections = Some(vec!["protein-mains".to_string()]);

        let response = orchestrator.recommend(request).await;
        // titles are "title-r1"/"title-r2" — no blocked substrings, so the
        // vegan filter lets both through; this asserts the filter runs
        // without erroring rather than asserting a specific drop.
        assert_eq!(response.total_results, 2);
    }

    #[tokio::test]
    async fn repeated_calls_with_identical_input_are_idempotent() {
        let mut hits_by_collection = HashMap::new();
        hits_by_collection.insert("quick-light".to_string(), vec![hit("r1", "quick-light", 0.9)]);
        let orchestrator = build_orchestrator(hits_by_collection, None).await;

        let make_request = || RecommendationRequest {
            conversation_history: dialogue("quick dinner"),
            max_results: 10,
            collections: Some(vec!["quick-light".to_string()]),
            user_preferences: None,
        };

        let first = orchestrator.recommend(make_request()).await;
        let second = orchestrator.recommend(make_request()).await;
        assert_eq!(first.query_analysis.generated_queries.0, second.query_analysis.generated_queries.0);
        assert_eq!(first.recommendations.len(), second.recommendations.len());
    }

    #[tokio::test]
    async fn startup_fails_fast_when_a_collection_is_missing() {
        let embedder = Arc::new(StubEmbeddingProvider::ok(vec![0.1; 768]));
        let vector_store = Arc::new(StubVectorStoreClient::new(HashMap::new(), vec!["quick-light".to_string()]));
        let catalog = Arc::new(Catalog::default());

        let result = RecommendationOrchestrator::new(embedder, vector_store, None, catalog, 4, 30_000).await;
        assert!(matches!(result, Err(AppError::CollectionMissing(_))));
    }

    #[tokio::test]
    async fn startup_fails_fast_when_embedder_is_unreachable() {
        let embedder = Arc::new(StubEmbeddingProvider::failing());
        let vector_store = Arc::new(StubVectorStoreClient::new(HashMap::new(), all_collections_known()));
        let catalog = Arc::new(Catalog::default());

        let result = RecommendationOrchestrator::new(embedder, vector_store, None, catalog, 4, 30_000).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn llm_present_is_consulted_for_analysis_and_planning() {
        let llm = Arc::new(StubLlmClient::ok(
            r#"{"preferences":["comfort"],"restrictions":[],"meal_context":"dinner","cooking_preferences":[],"ingredients_mentioned":[],"cuisine_preferences":[]}"#,
        ));
        let mut hits_by_collection = HashMap::new();
        hits_by_collection.insert("comfort-cooked".to_string(), vec![hit("r1", "comfort-cooked", 0.9)]);
        let orchestrator = build_orchestrator(hits_by_collection, Some(llm.clone())).await;

        let request = RecommendationRequest {
            conversation_history: dialogue("something cozy for dinner"),
            max_results: 10,
            collections: None,
            user_preferences: None,
        };

        let response = orchestrator.recommend(request).await;
        assert_eq!(response.query_analysis.meal_context.as_deref(), Some("dinner"));
        assert!(!llm.calls.lock().unwrap().is_empty());
    }
}
