use actix_web::{post, web, HttpResponse};
use bioblock_vector::{normalize_filters, shape_results, WhereClause};
use std::sync::Arc;
use tracing::debug;

use crate::error::{failed, ApiError};
use crate::state::AppState;
use crate::types::{FilterRequest, FilterResponse};

/// Metadata-only lookup. `total_found` counts matches before truncation.
#[post("/filter")]
pub async fn filter(
    req: web::Json<FilterRequest>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let where_clause = normalize_filters(&req.filters);
    debug!(
        "Filter where clause: {:?}",
        where_clause.as_ref().map(WhereClause::to_json)
    );

    let records = state
        .store
        .get(where_clause.as_ref())
        .await
        .map_err(failed("Failed to filter data"))?;
    let total_found = records.len();

    let mut results = shape_results(records).map_err(failed("Failed to filter data"))?;
    if req.n_results > 0 {
        results.truncate(req.n_results);
    }
    debug!("Filter matched {} records, returning {}", total_found, results.len());

    Ok(HttpResponse::Ok().json(FilterResponse {
        results,
        total_found,
    }))
}
