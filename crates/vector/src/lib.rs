//! Bio-Block vector storage
//!
//! Metadata model, filter normalization, result shaping, ingestion and the
//! local collection store.

mod distance;
mod engine;
mod filter;
mod id;
mod ingest;
mod shaping;
mod store;
mod types;

pub use distance::{score_from_distance, squared_l2};
pub use engine::LocalVectorStore;
pub use filter::{normalize_filters, WhereClause};
pub use id::generate_id;
pub use ingest::{ingest, NewRecord, PreparedRecord};
pub use shaping::{shape_results, SearchHit};
pub use store::VectorStore;
pub use types::{
    Collection, CollectionEntry, CollectionStats, Metadata, MetadataValue, StoreRecord,
    CONTENT_ID_KEY, DATASET_TITLE_KEY, DISEASE_TAGS_KEY,
};
