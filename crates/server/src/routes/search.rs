use actix_web::{post, web, HttpResponse};
use bioblock_vector::{normalize_filters, shape_results, WhereClause};
use std::sync::Arc;
use tracing::debug;

use crate::error::{failed, ApiError};
use crate::state::AppState;
use crate::types::{default_search_limit, FilteredSearchRequest, SearchRequest, SearchResponse};

/// Similarity search over all documents, top 5
#[post("/search")]
pub async fn search(
    req: web::Json<SearchRequest>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    if req.query.trim().is_empty() {
        return Err(ApiError::bad_request("Query is required"));
    }

    let records = state
        .store
        .query(&req.query, default_search_limit(), None)
        .await
        .map_err(failed("Failed to search data"))?;
    let results = shape_results(records).map_err(failed("Failed to search data"))?;

    Ok(HttpResponse::Ok().json(SearchResponse { results }))
}

/// Similarity search restricted by metadata equality filters
#[post("/search_with_filter")]
pub async fn search_with_filter(
    req: web::Json<FilteredSearchRequest>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();

    // Embedded exactly as sent, like `/search`
    let query = match req.query {
        Some(q) if !q.trim().is_empty() => q,
        _ => return Err(ApiError::bad_request("Query is required")),
    };
    if req.n_results == 0 {
        return Err(ApiError::bad_request("n_results must be a positive integer"));
    }

    let where_clause = normalize_filters(&req.filters);
    debug!(
        "Search with filter - query: {}, where: {:?}",
        query,
        where_clause.as_ref().map(WhereClause::to_json)
    );

    let records = state
        .store
        .query(&query, req.n_results, where_clause.as_ref())
        .await
        .map_err(failed("Failed to search with filter"))?;
    let results = shape_results(records).map_err(failed("Failed to search with filter"))?;

    Ok(HttpResponse::Ok().json(SearchResponse { results }))
}
