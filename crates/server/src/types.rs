use bioblock_vector::{Metadata, SearchHit};
use serde::{Deserialize, Serialize};

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// POST /store
#[derive(Debug, Deserialize)]
pub struct StoreRequest {
    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub cid: String,

    #[serde(default)]
    pub dataset_title: Option<String>,

    /// Free-form scalar metadata
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Serialize)]
pub struct StoreResponse {
    pub message: String,
    pub cid: String,
}

/// POST /search
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

/// POST /filter
#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub filters: Metadata,

    /// Truncation bound; 0 disables it
    #[serde(default = "default_filter_limit")]
    pub n_results: usize,
}

fn default_filter_limit() -> usize {
    10
}

#[derive(Debug, Serialize)]
pub struct FilterResponse {
    pub results: Vec<SearchHit>,
    pub total_found: usize,
}

/// POST /search_with_filter
#[derive(Debug, Deserialize)]
pub struct FilteredSearchRequest {
    #[serde(default)]
    pub query: Option<String>,

    #[serde(default)]
    pub filters: Metadata,

    #[serde(default = "default_search_limit")]
    pub n_results: usize,
}

pub fn default_search_limit() -> usize {
    5
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

/// POST /embed
#[derive(Debug, Deserialize)]
pub struct EmbedRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    pub embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
    pub version: String,
    pub endpoints: Vec<String>,
}
