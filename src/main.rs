//! Recommendation API — Rust + Actix-Web RAG service over a Qdrant-backed
//! recipe corpus, with graceful LLM degradation to heuristic analysis and
//! planning (spec §4.8, §6.2).

mod catalog;
mod collections;
mod config;
mod errors;
mod handlers;
mod middleware;
mod models;
mod services;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use secrecy::ExposeSecret;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::handlers::configure_recommend;
use crate::middleware::ConcurrencyLimit;
use crate::services::{
    EmbeddingProvider, GeminiLlmClient, HttpEmbeddingProvider, LlmClient, QdrantVectorStoreClient,
    RecommendationOrchestrator, VectorStoreClient,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,recommend_api=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting recommendation API");

    let config = Config::from_env().expect("Failed to load configuration");
    let bind_address = format!("{}:{}", config.host, config.port);
    let cors_origin = config.cors_origin.clone();

    let http = reqwest::Client::builder()
        .build()
        .expect("Failed to build HTTP client");

    // C1, C2: process-wide singletons. Initialization fails fast if either
    // is unreachable (spec §4.8) — the orchestrator itself performs the
    // connectivity probe below.
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HttpEmbeddingProvider::new(
        http.clone(),
        config.embedding_service_url.clone(),
        config.embedding_model_name.clone(),
    ));
    let vector_store: Arc<dyn VectorStoreClient> =
        Arc::new(QdrantVectorStoreClient::new(http.clone(), config.vector_store_url.clone()));

    // C3: absent credentials degrade to heuristic-only mode rather than
    // failing startup (spec §6.2).
    let llm: Option<Arc<dyn LlmClient>> = config.llm_api_key.as_ref().map(|key| {
        Arc::new(GeminiLlmClient::new(
            http.clone(),
            config.llm_model_name.clone(),
            secrecy::SecretString::from(key.expose_secret().to_owned()),
        )) as Arc<dyn LlmClient>
    });

    let catalog = Arc::new(
        Catalog::load(&config.classified_recipes_path)
            .expect("Failed to load classified recipes catalog"),
    );
    tracing::info!(recipes = catalog.len(), "classified recipes catalog loaded");

    let orchestrator = Arc::new(
        RecommendationOrchestrator::new(
            embedder,
            vector_store,
            llm,
            catalog,
            config.max_parallel_searches,
            config.request_timeout_ms,
        )
        .await
        .expect("Failed to initialize recommendation orchestrator"),
    );

    // Built once and cloned into every worker so the cap is process-wide,
    // not per-worker (spec §5's `max_inflight_requests`).
    let concurrency_limit = ConcurrencyLimit::new(config.max_inflight_requests);

    tracing::info!("Server starting on {}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .app_data(web::JsonConfig::default().limit(1024 * 1024))
            .wrap(Logger::default())
            .wrap(cors)
            .wrap(concurrency_limit.clone())
            .app_data(web::Data::new(orchestrator.clone()))
            .configure(configure_recommend)
            .route(
                "/health",
                web::get().to(|| async {
                    actix_web::HttpResponse::Ok().json(serde_json::json!({
                        "status": "healthy",
                        "service": "recommend-api"
                    }))
                }),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
