use std::sync::Arc;

use actix_web::{post, web, HttpResponse};

use crate::models::RecommendationRequest;
use crate::services::RecommendationOrchestrator;

#[post("/recommendations")]
async fn recommend(
    orchestrator: web::Data<Arc<RecommendationOrchestrator>>,
    body: web::Json<RecommendationRequest>,
) -> HttpResponse {
    let response = orchestrator.recommend(body.into_inner()).await;
    HttpResponse::Ok().json(response)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(recommend);
}
