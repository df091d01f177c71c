use actix_web::{post, web, HttpResponse};
use std::sync::Arc;

use crate::error::{failed, ApiError};
use crate::state::AppState;
use crate::types::{EmbedRequest, EmbedResponse};

/// Raw embedding vector for a text
#[post("/embed")]
pub async fn embed(
    req: web::Json<EmbedRequest>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let embedding = state
        .embedder
        .embed(&req.text)
        .await
        .map_err(failed("Failed to generate embedding"))?;

    Ok(HttpResponse::Ok().json(EmbedResponse { embedding }))
}
