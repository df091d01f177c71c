use bioblock_common::{AppConfig, Result};
use bioblock_embed::{build_embedder, Embedder};
use bioblock_redact::Redactor;
use bioblock_vector::{LocalVectorStore, VectorStore};
use std::sync::Arc;
use tracing::info;

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Document collection
    pub store: Arc<dyn VectorStore>,

    /// Embedding model, shared with the store
    pub embedder: Arc<dyn Embedder>,

    /// PII redactor for uploaded spreadsheets
    pub redactor: Arc<Redactor>,
}

impl AppState {
    /// Build the embedder and open the persisted collection
    pub fn new(config: AppConfig) -> Result<Self> {
        let embedder = build_embedder(&config)?;
        let store = LocalVectorStore::open(
            config.collection_path(),
            &config.collection_name,
            embedder.clone(),
        )?;

        info!(
            "State ready - collection '{}' at {}, model '{}'",
            config.collection_name,
            config.collection_path().display(),
            embedder.model_name()
        );

        Ok(Self::with_components(config, Arc::new(store), embedder))
    }

    pub fn with_components(
        config: AppConfig,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            config,
            store,
            embedder,
            redactor: Arc::new(Redactor::default()),
        }
    }
}
