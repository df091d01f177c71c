use actix_web::{post, web, HttpResponse};
use bioblock_vector::{ingest, NewRecord};
use std::sync::Arc;
use tracing::info;

use crate::error::{failed, ApiError};
use crate::state::AppState;
use crate::types::{StoreRequest, StoreResponse};

/// Store one dataset summary
#[post("/store")]
pub async fn store(
    req: web::Json<StoreRequest>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    let record = NewRecord {
        summary: req.summary,
        cid: req.cid,
        dataset_title: req.dataset_title,
        extra_fields: req.metadata,
    };

    let prepared = ingest(state.store.as_ref(), &record, state.config.id_scheme)
        .await
        .map_err(failed("Failed to store data"))?;

    info!("Stored {} for cid {}", prepared.id, record.cid);

    Ok(HttpResponse::Ok().json(StoreResponse {
        message: "Stored successfully".to_string(),
        cid: record.cid,
    }))
}
