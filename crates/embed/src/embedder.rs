use async_trait::async_trait;
use bioblock_common::{AppConfig, EmbeddingBackend, Result};
use std::sync::Arc;
use tracing::info;

use crate::hashing::HashingEmbedder;
use crate::ollama::OllamaEmbedder;

/// Common trait for embedding models
///
/// Implementations must be deterministic for identical input and must
/// accept an empty string, returning a zero vector of [`Embedder::dimension`].
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector this embedder returns
    fn dimension(&self) -> usize;

    /// Model identifier, reported by `/stats`
    fn model_name(&self) -> &str;
}

/// Build the embedder selected by configuration
pub fn build_embedder(config: &AppConfig) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match config.embedding_backend {
        EmbeddingBackend::Ollama => Arc::new(OllamaEmbedder::new(
            &config.ollama_base_url,
            &config.embedding_model,
            config.embedding_dim,
        )?),
        EmbeddingBackend::Hashing => Arc::new(HashingEmbedder::new(config.embedding_dim)),
    };

    info!(
        "Embedder ready: backend={:?}, model={}, dim={}",
        config.embedding_backend,
        embedder.model_name(),
        embedder.dimension()
    );

    Ok(embedder)
}
