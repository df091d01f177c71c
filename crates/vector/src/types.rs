use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata key holding the content identifier (IPFS CID)
pub const CONTENT_ID_KEY: &str = "cid";

/// Metadata key holding the dataset title
pub const DATASET_TITLE_KEY: &str = "dataset_title";

/// Metadata key whose value is appended to the document body
pub const DISEASE_TAGS_KEY: &str = "disease_tags";

/// A scalar metadata value.
///
/// Untagged in JSON, so `null`, arrays and objects fail to deserialize and
/// are rejected at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl MetadataValue {
    /// Exact-match comparison used by metadata filters.
    ///
    /// Integers and floats compare numerically; other types must match exactly.
    pub fn matches(&self, other: &MetadataValue) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => *a as f64 == *b,
            _ => self == other,
        }
    }

    /// Truthiness: non-empty string, `true`, or a non-zero number
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for MetadataValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Record metadata, in insertion order
pub type Metadata = IndexMap<String, MetadataValue>;

/// A record as stored in a collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionEntry {
    /// Record ID
    pub id: String,

    /// Stored document body
    pub document: String,

    /// Record metadata
    pub metadata: Metadata,

    /// Embedding of `document`
    pub embedding: Vec<f32>,

    /// Timestamp when indexed
    pub indexed_at: DateTime<Utc>,
}

/// Persisted collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Collection name
    pub name: String,

    /// Embedding model used
    pub embedding_model: String,

    /// Embedding dimension, fixed by the first insert
    #[serde(default)]
    pub embedding_dim: Option<usize>,

    /// Entries in insertion order (id -> entry)
    pub entries: IndexMap<String, CollectionEntry>,
}

impl Collection {
    /// Create new empty collection
    pub fn new(name: impl Into<String>, embedding_model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            embedding_model: embedding_model.into(),
            embedding_dim: None,
            entries: IndexMap::new(),
        }
    }

    /// Count entries
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

/// A record returned by the store, with its distance on the similarity path
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRecord {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
    pub distance: Option<f32>,
}

/// Collection statistics
#[derive(Debug, Clone, Serialize)]
pub struct CollectionStats {
    pub collection: String,
    pub total_documents: usize,
    pub embedding_model: String,
    pub embedding_dim: usize,
}
