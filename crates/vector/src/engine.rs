use async_trait::async_trait;
use bioblock_common::{BioBlockError, Result};
use bioblock_embed::Embedder;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::distance::squared_l2;
use crate::filter::WhereClause;
use crate::store::VectorStore;
use crate::types::{Collection, CollectionEntry, CollectionStats, Metadata, StoreRecord};

/// Local collection: flat exact search over a JSON-persisted index
pub struct LocalVectorStore {
    collection: Arc<RwLock<Collection>>,
    /// `None` keeps the collection in memory only
    path: Option<PathBuf>,
    embedder: Arc<dyn Embedder>,
}

impl LocalVectorStore {
    /// Open the collection at `path`, creating it on first write
    pub fn open(
        path: impl Into<PathBuf>,
        name: &str,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let path = path.into();

        // Load or create collection
        let collection = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            let collection: Collection = serde_json::from_str(&data).map_err(|e| {
                BioBlockError::vector_store(format!(
                    "Corrupt collection file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            if collection.embedding_model != embedder.model_name() {
                warn!(
                    "Collection '{}' was built with '{}', now embedding with '{}'",
                    collection.name,
                    collection.embedding_model,
                    embedder.model_name()
                );
            }
            collection
        } else {
            Collection::new(name, embedder.model_name())
        };

        info!(
            "Vector store initialized - collection '{}', {} entries",
            collection.name,
            collection.count()
        );

        Ok(Self {
            collection: Arc::new(RwLock::new(collection)),
            path: Some(path),
            embedder,
        })
    }

    /// Collection that is never written to disk
    pub fn in_memory(name: &str, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            collection: Arc::new(RwLock::new(Collection::new(name, embedder.model_name()))),
            path: None,
            embedder,
        }
    }

    /// Save collection to file (write to a temp file, then rename)
    async fn save(&self, collection: &Collection) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let data = serde_json::to_string(collection)?;
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await?;
        tokio::fs::rename(&temp_path, path).await?;
        Ok(())
    }

    fn check_dimension(collection: &Collection, embedding: &[f32]) -> Result<()> {
        match collection.embedding_dim {
            Some(dim) if dim != embedding.len() => Err(BioBlockError::vector_store(format!(
                "Embedding dimension {} does not match collection dimension {}",
                embedding.len(),
                dim
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn add(&self, id: &str, document: &str, metadata: Metadata) -> Result<()> {
        debug!("Adding document to collection: {}", id);

        // Embed before taking the write lock
        let embedding = self.embedder.embed(document).await?;

        let mut collection = self.collection.write().await;
        Self::check_dimension(&collection, &embedding)?;

        let entry = CollectionEntry {
            id: id.to_string(),
            document: document.to_string(),
            metadata,
            embedding,
            indexed_at: chrono::Utc::now(),
        };
        let dim_before = collection.embedding_dim;
        collection.embedding_dim = Some(entry.embedding.len());
        let previous = collection.entries.insert(id.to_string(), entry);

        if let Err(e) = self.save(&collection).await {
            // Roll back so a failed request leaves nothing behind
            match previous {
                Some(previous) => {
                    collection.entries.insert(id.to_string(), previous);
                }
                None => {
                    collection.entries.shift_remove(id);
                }
            }
            collection.embedding_dim = dim_before;
            return Err(e);
        }

        Ok(())
    }

    async fn query(
        &self,
        query_text: &str,
        n_results: usize,
        filter: Option<&WhereClause>,
    ) -> Result<Vec<StoreRecord>> {
        debug!("Querying: {} (n_results={}, filter={:?})", query_text, n_results, filter.map(WhereClause::to_json));

        let query_embedding = self.embedder.embed(query_text).await?;

        let collection = self.collection.read().await;
        Self::check_dimension(&collection, &query_embedding)?;

        let mut scored = Vec::new();
        for entry in collection.entries.values() {
            if filter.is_some_and(|f| !f.matches(&entry.metadata)) {
                continue;
            }
            let distance = squared_l2(&query_embedding, &entry.embedding)?;
            scored.push((distance, entry));
        }

        // Sort by distance (ascending); ties keep insertion order
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(n_results);

        debug!("Query matched {} of {} entries", scored.len(), collection.count());

        Ok(scored
            .into_iter()
            .map(|(distance, entry)| StoreRecord {
                id: entry.id.clone(),
                document: entry.document.clone(),
                metadata: entry.metadata.clone(),
                distance: Some(distance),
            })
            .collect())
    }

    async fn get(&self, filter: Option<&WhereClause>) -> Result<Vec<StoreRecord>> {
        let collection = self.collection.read().await;

        Ok(collection
            .entries
            .values()
            .filter(|entry| filter.map_or(true, |f| f.matches(&entry.metadata)))
            .map(|entry| StoreRecord {
                id: entry.id.clone(),
                document: entry.document.clone(),
                metadata: entry.metadata.clone(),
                distance: None,
            })
            .collect())
    }

    async fn stats(&self) -> CollectionStats {
        let collection = self.collection.read().await;
        CollectionStats {
            collection: collection.name.clone(),
            total_documents: collection.count(),
            embedding_model: self.embedder.model_name().to_string(),
            embedding_dim: collection.embedding_dim.unwrap_or(self.embedder.dimension()),
        }
    }
}
