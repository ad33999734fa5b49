pub mod analyzer;
pub mod embedding;
pub mod llm;
pub mod orchestrator;
pub mod planner;
pub mod preference_filter;
pub mod search;
pub mod vector_store;

pub use analyzer::ConversationAnalyzer;
pub use embedding::{EmbeddingProvider, HttpEmbeddingProvider};
pub use llm::{GeminiLlmClient, LlmClient};
pub use orchestrator::RecommendationOrchestrator;
pub use planner::QueryPlanner;
pub use preference_filter::PreferenceFilter;
pub use search::SearchExecutor;
pub use vector_store::{QdrantVectorStoreClient, VectorStoreClient};
