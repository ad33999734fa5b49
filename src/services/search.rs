//! C6 — Search Executor

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::catalog::Catalog;
use crate::models::{Hit, QueryPlan, Recommendation};
use crate::services::embedding::EmbeddingProvider;
use crate::services::vector_store::VectorStoreClient;

/// Number of results requested per individual query against the vector
/// store, before cross-query/cross-collection deduplication (spec §4.6).
const RESULTS_PER_QUERY: usize = 2;

pub struct SearchExecutor {
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStoreClient>,
    catalog: Arc<Catalog>,
    max_parallel_searches: usize,
}

impl SearchExecutor {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStoreClient>,
        catalog: Arc<Catalog>,
        max_parallel_searches: usize,
    ) -> Self {
        Self {
            embedder,
            vector_store,
            catalog,
            max_parallel_searches,
        }
    }

    /// Runs every (collection, query) pair in the plan against the vector
    /// store, bounded to `max_parallel_searches` concurrent tasks, then
    /// deduplicates and enriches the results.
    pub async fn search(&self, plan: &QueryPlan) -> Vec<Recommendation> {
        let semaphore = Arc::new(Semaphore::new(self.max_parallel_searches.max(1)));
        let mut tasks = Vec::new();

        for (collection, queries) in plan.iter() {
            for query in queries {
                let semaphore = semaphore.clone();
                let embedder = self.embedder.clone();
                let vector_store = self.vector_store.clone();
                let collection = collection.clone();
                let query = query.clone();

                tasks.push(tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
                    run_one_search(embedder.as_ref(), vector_store.as_ref(), &collection, &query).await
                }));
            }
        }

        let results = join_all(tasks).await;
        let mut hits = Vec::new();
        for result in results {
            match result {
                Ok(Ok(mut found)) => hits.append(&mut found),
                Ok(Err(e)) => tracing::warn!("search task failed: {e}"),
                Err(e) => tracing::warn!("search task panicked: {e}"),
            }
        }

        let deduped = dedup_by_recipe_id(hits);
        self.enrich(deduped)
    }

    fn enrich(&self, hits: Vec<Hit>) -> Vec<Recommendation> {
        hits.into_iter()
            .map(|hit| {
                let metadata = self
                    .catalog
                    .get(&hit.recipe_id)
                    .map(|entry| {
                        let mut original_data = entry.original_data.clone();
                        original_data.insert(
                            "ingredients".to_string(),
                            Value::Array(entry.ingredients.iter().cloned().map(Value::String).collect()),
                        );
                        if let Some(instructions) = &entry.instructions {
                            original_data.insert("instructions".to_string(), Value::String(instructions.clone()));
                        }
                        if let Some(confidence) = entry.confidence {
                            original_data.insert(
                                "confidence".to_string(),
                                Value::Number(
                                    serde_json::Number::from_f64(confidence as f64).unwrap_or(0.into()),
                                ),
                            );
                        }

                        let mut map = serde_json::Map::new();
                        map.insert("original_data".to_string(), Value::Object(original_data));
                        map
                    })
                    .unwrap_or_default();
                Recommendation::from_hit(hit, metadata)
            })
            .collect()
    }
}

async fn run_one_search(
    embedder: &dyn EmbeddingProvider,
    vector_store: &dyn VectorStoreClient,
    collection: &str,
    query: &str,
) -> Result<Vec<Hit>, crate::errors::AppError> {
    let vector = embedder.embed(query).await?;
    vector_store.search(collection, &vector, RESULTS_PER_QUERY).await
}

/// Deduplicates hits by `recipe_id`, keeping the one with the highest
/// `similarity_score` (tie-break: `confidence`, then lexicographic
/// `recipe_id`), then sorts the survivors by `similarity_score` descending
/// with `recipe_id` ascending as the final tie-break (spec §4.6 steps 4-5, P4).
pub fn dedup_by_recipe_id(hits: Vec<Hit>) -> Vec<Hit> {
    let mut best: HashMap<String, Hit> = HashMap::new();

    for hit in hits {
        best.entry(hit.recipe_id.clone())
            .and_modify(|existing| {
                if is_better(&hit, existing) {
                    *existing = hit.clone();
                }
            })
            .or_insert(hit);
    }

    let mut deduped: Vec<Hit> = best.into_values().collect();
    deduped.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.recipe_id.cmp(&b.recipe_id))
    });
    deduped
}

fn is_better(candidate: &Hit, existing: &Hit) -> bool {
    match candidate.similarity_score.partial_cmp(&existing.similarity_score) {
        Some(std::cmp::Ordering::Greater) => true,
        Some(std::cmp::Ordering::Less) => false,
        _ => match candidate.confidence.partial_cmp(&existing.confidence) {
            Some(std::cmp::Ordering::Greater) => true,
            Some(std::cmp::Ordering::Less) => false,
            _ => candidate.recipe_id < existing.recipe_id,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::embedding::stub::StubEmbeddingProvider;
    use crate::services::vector_store::stub::StubVectorStoreClient;
    use std::collections::HashMap as Map;

    fn hit(id: &str, collection: &str, score: f32, confidence: f32) -> Hit {
        Hit {
            recipe_id: id.to_string(),
            collection: collection.to_string(),
            similarity_score: score,
            title: format!("title-{id}"),
            summary: String::new(),
            ingredients_preview: Vec::new(),
            confidence,
        }
    }

    #[test]
    fn dedup_keeps_highest_similarity_score() {
        let hits = vec![hit("r1", "a", 0.5, 0.5), hit("r1", "b", 0.9, 0.5)];
        let deduped = dedup_by_recipe_id(hits);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].collection, "b");
    }

    #[test]
    fn dedup_tie_breaks_on_confidence_then_recipe_id() {
        let hits = vec![
            hit("r2", "a", 0.8, 0.3),
            hit("r2", "b", 0.8, 0.9),
            hit("r1", "c", 0.8, 0.9),
        ];
        let deduped = dedup_by_recipe_id(hits);
        assert_eq!(deduped[0].recipe_id, "r1");
        assert_eq!(deduped[1].collection, "b");
    }

    #[test]
    fn final_sort_orders_by_score_desc_then_id_asc() {
        let hits = vec![hit("r2", "a", 0.5, 0.5), hit("r1", "b", 0.9, 0.5), hit("r3", "c", 0.9, 0.5)];
        let deduped = dedup_by_recipe_id(hits);
        assert_eq!(deduped[0].recipe_id, "r1");
        assert_eq!(deduped[1].recipe_id, "r3");
        assert_eq!(deduped[2].recipe_id, "r2");
    }

    #[tokio::test]
    async fn search_fans_out_and_enriches_from_catalog() {
        let embedder = Arc::new(StubEmbeddingProvider::ok(vec![0.1, 0.2]));
        let mut hits_by_collection = Map::new();
        hits_by_collection.insert("quick-light".to_string(), vec![hit("r1", "quick-light", 0.9, 0.9)]);
        let vector_store = Arc::new(StubVectorStoreClient::new(hits_by_collection, vec!["quick-light".to_string()]));
        let catalog = Arc::new(Catalog::default());

        let executor = SearchExecutor::new(embedder, vector_store, catalog, 4);
        let mut plan = QueryPlan::new();
        plan.insert("quick-light".to_string(), vec!["fast meal".to_string()]);

        let recommendations = executor.search(&plan).await;
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].recipe_id, "r1");
    }
}
