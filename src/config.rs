use std::env;
use std::path::PathBuf;

use secrecy::SecretString;

#[derive(Clone)]
pub struct Config {
    /// Absent → the service starts in heuristic-only mode (spec §6.2, §4.8).
    pub llm_api_key: Option<SecretString>,
    pub llm_model_name: String,
    pub vector_store_url: String,
    pub embedding_service_url: String,
    pub embedding_model_name: String,
    pub classified_recipes_path: PathBuf,
    pub max_parallel_searches: usize,
    pub max_inflight_requests: usize,
    pub request_timeout_ms: u64,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let llm_api_key = env::var("LLM_API_KEY").ok().map(SecretString::from);
        if llm_api_key.is_none() {
            tracing::warn!(
                "LLM_API_KEY not set — starting in heuristic-only mode (no LLM-driven analysis or planning)"
            );
        }

        let llm_model_name = env::var("LLM_MODEL_NAME")
            .unwrap_or_else(|_| "gemini-2.5-flash".to_string());

        let vector_store_url = env::var("VECTOR_STORE_URL")
            .map_err(|_| ConfigError::Missing("VECTOR_STORE_URL"))?;

        let embedding_service_url = env::var("EMBEDDING_SERVICE_URL")
            .unwrap_or_else(|_| "http://localhost:8000/embed".to_string());

        let embedding_model_name = env::var("EMBEDDING_MODEL_NAME")
            .unwrap_or_else(|_| "all-mpnet-base-v2".to_string());

        let classified_recipes_path: PathBuf = env::var("CLASSIFIED_RECIPES_PATH")
            .map_err(|_| ConfigError::Missing("CLASSIFIED_RECIPES_PATH"))?
            .into();

        let max_parallel_searches: usize = env::var("MAX_PARALLEL_SEARCHES")
            .unwrap_or_else(|_| "16".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("MAX_PARALLEL_SEARCHES must be a number"))?;

        let max_inflight_requests: usize = env::var("MAX_INFLIGHT_REQUESTS")
            .unwrap_or_else(|_| "64".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("MAX_INFLIGHT_REQUESTS must be a number"))?;

        let request_timeout_ms: u64 = env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("REQUEST_TIMEOUT_MS must be a number"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT must be a valid port number"))?;

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            llm_api_key,
            llm_model_name,
            vector_store_url,
            embedding_service_url,
            embedding_model_name,
            classified_recipes_path,
            max_parallel_searches,
            max_inflight_requests,
            request_timeout_ms,
            host,
            port,
            cors_origin,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    InvalidValue(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
