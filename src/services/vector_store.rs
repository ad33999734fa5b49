//! C2 — Vector Store Client

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::Hit;

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_MS: u64 = 100;
const RETRY_FACTOR: u64 = 2;
const RETRY_JITTER: f64 = 0.25;

#[async_trait]
pub trait VectorStoreClient: Send + Sync {
    async fn search(&self, collection: &str, query_vector: &[f32], k: usize) -> Result<Vec<Hit>, AppError>;
    async fn collection_exists(&self, collection: &str) -> Result<bool, AppError>;
    async fn collection_size(&self, collection: &str) -> Result<u64, AppError>;
}

/// Exponential backoff with `base * factor^attempt`, jittered by up to
/// `RETRY_JITTER` in either direction, retried up to `RETRY_ATTEMPTS` times.
async fn retry_with_backoff<T, F, Fut>(operation_name: &str, mut f: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, AppError>>,
{
    let mut last_err = None;
    for attempt in 0..RETRY_ATTEMPTS {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!(
                    "{operation_name} failed (attempt {}/{RETRY_ATTEMPTS}): {e}",
                    attempt + 1
                );
                last_err = Some(e);
                if attempt + 1 < RETRY_ATTEMPTS {
                    let base = RETRY_BASE_MS * RETRY_FACTOR.pow(attempt);
                    let jitter_range = (base as f64 * RETRY_JITTER) as i64;
                    let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
                    let delay_ms = (base as i64 + jitter).max(0) as u64;
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| AppError::VectorStoreUnavailable(operation_name.to_string())))
}

#[derive(Serialize)]
struct QdrantSearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Deserialize)]
struct QdrantSearchResponse {
    result: Vec<QdrantScoredPoint>,
}

#[derive(Deserialize)]
struct QdrantScoredPoint {
    id: serde_json::Value,
    score: f32,
    payload: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize)]
struct QdrantCollectionInfoResponse {
    result: QdrantCollectionInfo,
}

#[derive(Deserialize)]
struct QdrantCollectionInfo {
    points_count: Option<u64>,
}

pub struct QdrantVectorStoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl QdrantVectorStoreClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/collections/{}", self.base_url.trim_end_matches('/'), collection)
    }
}

#[async_trait]
impl VectorStoreClient for QdrantVectorStoreClient {
    async fn search(&self, collection: &str, query_vector: &[f32], k: usize) -> Result<Vec<Hit>, AppError> {
        let collection = collection.to_string();
        retry_with_backoff("vector store search", || {
            let collection = collection.clone();
            async {
                let url = format!("{}/points/search", self.collection_url(&collection));
                let body = QdrantSearchRequest {
                    vector: query_vector,
                    limit: k,
                    with_payload: true,
                };

                let response = self.http.post(&url).json(&body).send().await.map_err(|e| {
                    AppError::VectorStoreUnavailable(e.to_string())
                })?;

                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(AppError::CollectionMissing(collection.clone()));
                }
                if !response.status().is_success() {
                    let status = response.status();
                    return Err(AppError::VectorStoreUnavailable(format!(
                        "qdrant returned status {status}"
                    )));
                }

                let parsed: QdrantSearchResponse = response
                    .json()
                    .await
                    .map_err(|e| AppError::VectorStoreUnavailable(e.to_string()))?;

                let hits = parsed
                    .result
                    .into_iter()
                    .map(|point| point_to_hit(&collection, point))
                    .collect();
                Ok(hits)
            }
        })
        .await
    }

    async fn collection_exists(&self, collection: &str) -> Result<bool, AppError> {
        let url = self.collection_url(collection);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::VectorStoreUnavailable(e.to_string()))?;
        Ok(response.status().is_success())
    }

    async fn collection_size(&self, collection: &str) -> Result<u64, AppError> {
        let url = self.collection_url(collection);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::VectorStoreUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::CollectionMissing(collection.to_string()));
        }

        let parsed: QdrantCollectionInfoResponse = response
            .json()
            .await
            .map_err(|e| AppError::VectorStoreUnavailable(e.to_string()))?;
        Ok(parsed.result.points_count.unwrap_or(0))
    }
}

fn point_to_hit(collection: &str, point: QdrantScoredPoint) -> Hit {
    let payload = point.payload.unwrap_or_default();
    let recipe_id = payload
        .get("recipe_id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| point.id.to_string());
    let title = payload
        .get("title")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let summary = payload
        .get("summary")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let ingredients_preview = payload
        .get("ingredients")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .take(5)
                .collect()
        })
        .unwrap_or_default();
    let confidence = payload
        .get("confidence")
        .and_then(|v| v.as_f64())
        .map(|v| v as f32)
        .unwrap_or(point.score);

    Hit {
        recipe_id,
        collection: collection.to_string(),
        similarity_score: point.score,
        title,
        summary,
        ingredients_preview,
        confidence,
    }
}
