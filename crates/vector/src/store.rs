use async_trait::async_trait;
use bioblock_common::Result;

use crate::filter::WhereClause;
use crate::types::{CollectionStats, Metadata, StoreRecord};

/// A named collection of documents with metadata and embeddings
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Embed and insert one document. An existing id is overwritten.
    async fn add(&self, id: &str, document: &str, metadata: Metadata) -> Result<()>;

    /// Nearest documents to `query_text`, ascending distance, at most `n_results`
    async fn query(
        &self,
        query_text: &str,
        n_results: usize,
        filter: Option<&WhereClause>,
    ) -> Result<Vec<StoreRecord>>;

    /// All documents matching `filter`, in insertion order, without distances
    async fn get(&self, filter: Option<&WhereClause>) -> Result<Vec<StoreRecord>>;

    /// Collection statistics
    async fn stats(&self) -> CollectionStats;
}
