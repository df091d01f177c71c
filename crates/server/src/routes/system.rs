use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use std::sync::Arc;

use crate::state::AppState;
use crate::types::HealthResponse;

const ENDPOINTS: [&str; 9] = [
    "/health",
    "/stats",
    "/store",
    "/search",
    "/filter",
    "/search_with_filter",
    "/embed",
    "/redact",
    "/anonymize",
];

/// Liveness probe
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "OK".to_string(),
        message: "Bio-Block API is running".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}

#[get("/stats")]
pub async fn stats(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(state.store.stats().await)
}
