//! C1 — Embedding Provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const EMBEDDING_DIM: usize = 768;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError>;
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

pub struct HttpEmbeddingProvider {
    http: reqwest::Client,
    endpoint: String,
    model_name: String,
}

impl HttpEmbeddingProvider {
    pub fn new(http: reqwest::Client, endpoint: String, model_name: String) -> Self {
        Self {
            http,
            endpoint,
            model_name,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "cannot embed an empty string".to_string(),
            ));
        }

        let req = EmbedRequest {
            model: &self.model_name,
            input: text,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&req)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("embedding provider request failed: {e}");
                AppError::EmbeddingUnavailable(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("embedding provider returned status {status}");
            return Err(AppError::EmbeddingUnavailable(format!(
                "embedding provider returned status {status}"
            )));
        }

        let body: EmbedResponse = response.json().await.map_err(|e| {
            tracing::error!("failed to decode embedding response: {e}");
            AppError::EmbeddingUnavailable(e.to_string())
        })?;

        Ok(body.embedding)
    }
}


#[cfg(test)]
mod tests {
    use super::stub::StubEmbeddingProvider;
    use super::*;

    #[tokio::test]
    async fn stub_rejects_empty_input() {
        let provider = StubEmbeddingProvider::ok(vec![0.0; EMBEDDING_DIM]);
        let result = provider.embed("   ").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn stub_returns_configured_vector() {
        let provider = StubEmbeddingProvider::ok(vec![1.0, 2.0, 3.0]);
        let vector = provider.embed("chicken soup").await.unwrap();
        assert_eq!(vector, vec![1.0, 2.0, 3.0]);
    }
}
