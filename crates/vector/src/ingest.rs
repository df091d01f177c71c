//! Ingestion: turn a summary plus free-form metadata into a stored record.

use bioblock_common::{BioBlockError, IdScheme, Result};
use tracing::{debug, info};

use crate::id::generate_id;
use crate::store::VectorStore;
use crate::types::{Metadata, MetadataValue, CONTENT_ID_KEY, DATASET_TITLE_KEY, DISEASE_TAGS_KEY};

/// A dataset summary to ingest
#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    /// Free-text description of the dataset
    pub summary: String,

    /// Content identifier
    pub cid: String,

    /// Optional dataset title, prepended to the body
    pub dataset_title: Option<String>,

    /// Caller-supplied metadata
    pub extra_fields: Metadata,
}

/// Record ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRecord {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
}

impl NewRecord {
    /// Title as sent; blank titles count as absent
    fn title(&self) -> Option<&str> {
        self.dataset_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    /// Reject records missing the summary or content id
    pub fn validate(&self) -> Result<()> {
        if self.summary.trim().is_empty() || self.cid.trim().is_empty() {
            return Err(BioBlockError::invalid_input("Missing 'summary' or 'cid'"));
        }
        Ok(())
    }

    /// Stored document body
    pub fn compose_document(&self) -> String {
        let mut document = match self.title() {
            Some(title) => format!("Dataset Title: {}\n{}", title, self.summary),
            None => self.summary.clone(),
        };

        if let Some(tags) = self
            .extra_fields
            .get(DISEASE_TAGS_KEY)
            .filter(|v| v.is_truthy())
        {
            document.push_str("\nDisease Tags: ");
            document.push_str(&tags.to_string());
        }

        document
    }

    /// Stored metadata: explicit `cid` and `dataset_title` first, then extra
    /// fields. Extra keys never shadow the explicit values.
    pub fn compose_metadata(&self) -> Metadata {
        let title = self.title();
        let mut metadata = Metadata::with_capacity(self.extra_fields.len() + 2);

        metadata.insert(CONTENT_ID_KEY.to_string(), MetadataValue::from(self.cid.as_str()));
        if let Some(title) = title {
            metadata.insert(DATASET_TITLE_KEY.to_string(), MetadataValue::from(title));
        }

        for (key, value) in &self.extra_fields {
            if key == CONTENT_ID_KEY || (key == DATASET_TITLE_KEY && title.is_some()) {
                continue;
            }
            metadata.insert(key.clone(), value.clone());
        }

        metadata
    }

    /// Assign an id and compose body and metadata
    pub fn prepare(&self, scheme: IdScheme) -> PreparedRecord {
        PreparedRecord {
            id: generate_id(scheme),
            document: self.compose_document(),
            metadata: self.compose_metadata(),
        }
    }
}

/// Validate, prepare and insert one record. Not idempotent: every call
/// stores a new record under a fresh id.
pub async fn ingest(
    store: &dyn VectorStore,
    record: &NewRecord,
    scheme: IdScheme,
) -> Result<PreparedRecord> {
    record.validate()?;

    let prepared = record.prepare(scheme);
    debug!("Prepared record {} with metadata {:?}", prepared.id, prepared.metadata);

    store
        .add(&prepared.id, &prepared.document, prepared.metadata.clone())
        .await?;

    info!("Stored record {} (cid={})", prepared.id, record.cid);
    Ok(prepared)
}
