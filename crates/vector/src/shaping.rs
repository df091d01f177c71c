use bioblock_common::Result;
use serde::Serialize;

use crate::distance::score_from_distance;
use crate::types::{Metadata, StoreRecord, CONTENT_ID_KEY};

/// Uniform result object returned by search and filter endpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,

    /// Content identifier read from metadata, empty when absent
    pub cid: String,

    /// Similarity score; only present on the similarity path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Stored document body
    pub summary: String,

    pub metadata: Metadata,
}

impl SearchHit {
    pub fn from_record(record: StoreRecord) -> Result<Self> {
        let score = record.distance.map(score_from_distance).transpose()?;
        let cid = record
            .metadata
            .get(CONTENT_ID_KEY)
            .map(|v| v.to_string())
            .unwrap_or_default();

        Ok(Self {
            id: record.id,
            cid,
            score,
            summary: record.document,
            metadata: record.metadata,
        })
    }
}

/// Shape store records into hits, keeping store order
pub fn shape_results(records: Vec<StoreRecord>) -> Result<Vec<SearchHit>> {
    records.into_iter().map(SearchHit::from_record).collect()
}
