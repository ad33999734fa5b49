use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

/// Application error types with security-conscious external messages.
/// `LLMTimeout`/`LLMUnavailable`/`EmbeddingUnavailable` are caught and
/// degraded to heuristics inside C4/C5/C6 (spec §7) — reaching the HTTP
/// boundary means that degradation path itself failed.
#[derive(Debug)]
pub enum AppError {
    /// Malformed request body (empty dialogue, unknown fields caught upstream).
    InvalidInput(String),
    /// C3 exceeded its call timeout.
    LLMTimeout,
    /// C3 transport or quota failure.
    LLMUnavailable(String),
    /// C1 transport or model failure.
    EmbeddingUnavailable(String),
    /// C2 failed after exhausting retries.
    VectorStoreUnavailable(String),
    /// C2 was asked to search a collection not in the fixed registry.
    CollectionMissing(String),
    /// Per-request wall-clock budget exceeded.
    RequestTimedOut,
    /// Global concurrency limit exceeded.
    TooManyInflight,
    /// Internal server error
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            AppError::LLMTimeout => write!(f, "LLM request timed out"),
            AppError::LLMUnavailable(_) => write!(f, "LLM unavailable"),
            AppError::EmbeddingUnavailable(_) => write!(f, "Embedding provider unavailable"),
            AppError::VectorStoreUnavailable(_) => write!(f, "Vector store unavailable"),
            AppError::CollectionMissing(name) => write!(f, "Unknown collection: {name}"),
            AppError::RequestTimedOut => write!(f, "Request exceeded its time budget"),
            AppError::TooManyInflight => write!(f, "Too many requests"),
            AppError::Internal(_) => write!(f, "Internal server error"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_response) = match self {
            AppError::InvalidInput(msg) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: msg.clone(),
                    details: None,
                },
            ),
            AppError::RequestTimedOut => {
                tracing::warn!("request exceeded its time budget");
                (
                    actix_web::http::StatusCode::OK,
                    ErrorResponse {
                        error: "Request exceeded its time budget".to_string(),
                        details: None,
                    },
                )
            }
            AppError::TooManyInflight => {
                tracing::warn!("rejecting request: max_inflight_requests exceeded");
                (
                    actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse {
                        error: "Too many requests in flight, try again shortly".to_string(),
                        details: None,
                    },
                )
            }
            AppError::LLMTimeout | AppError::LLMUnavailable(_) => {
                tracing::error!("LLM error reached the HTTP boundary: {}", self);
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "An internal error occurred".to_string(),
                        details: None,
                    },
                )
            }
            AppError::EmbeddingUnavailable(e) => {
                tracing::error!("embedding provider unavailable: {e}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "An internal error occurred".to_string(),
                        details: None,
                    },
                )
            }
            AppError::VectorStoreUnavailable(e) => {
                tracing::error!("vector store unavailable: {e}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "An internal error occurred".to_string(),
                        details: None,
                    },
                )
            }
            AppError::CollectionMissing(name) => {
                tracing::warn!("requested unknown collection: {name}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: format!("Unknown collection: {name}"),
                        details: None,
                    },
                )
            }
            AppError::Internal(e) => {
                tracing::error!("internal error: {e}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "An internal error occurred".to_string(),
                        details: None,
                    },
                )
            }
        };

        HttpResponse::build(status).json(error_response)
    }
}
