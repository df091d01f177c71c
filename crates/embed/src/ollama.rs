use async_trait::async_trait;
use bioblock_common::{BioBlockError, Result};
use reqwest::Client;
use tracing::{debug, info};

use crate::embedder::Embedder;
use crate::types::{EmbedRequest, EmbedResponse};

/// Ollama embedding client
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    dimension: usize,
    client: Client,
}

impl OllamaEmbedder {
    /// Create new Ollama embedding client
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        info!("Ollama embedder initialized: {}", base_url);
        Ok(Self {
            base_url,
            model: model.into(),
            dimension,
            client,
        })
    }

    /// Single request to the embeddings endpoint; failures surface immediately
    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbedRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        debug!("Generating embedding - Model: {}, Text length: {}", self.model, text.len());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BioBlockError::network(format!("Failed to send embedding request: {}", e)))?
            .error_for_status()
            .map_err(|e| BioBlockError::embedding(format!("Ollama embedding API error: {}", e)))?;

        let result: EmbedResponse = response.json().await
            .map_err(|e| BioBlockError::embedding(format!("Failed to parse embedding response: {}", e)))?;

        if result.embedding.len() != self.dimension {
            return Err(BioBlockError::embedding(format!(
                "Invalid embedding received: expected {} dimensions, got {}",
                self.dimension,
                result.embedding.len()
            )));
        }

        debug!("Received embedding - Dimension: {}", result.embedding.len());
        Ok(result.embedding)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        // Ollama answers an empty prompt with an empty vector
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }
        self.request_embedding(text).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{web, App, HttpResponse, HttpServer};

    async fn fake_embeddings(body: web::Json<serde_json::Value>) -> HttpResponse {
        let prompt = body["prompt"].as_str().unwrap_or_default();
        let dim = if prompt == "short" { 2 } else { 3 };
        let embedding: Vec<f32> = (0..dim).map(|i| i as f32 + prompt.len() as f32).collect();
        HttpResponse::Ok().json(serde_json::json!({ "embedding": embedding }))
    }

    fn spawn_fake_ollama() -> String {
        let server = HttpServer::new(|| {
            App::new()
                .route("/api/embeddings", web::post().to(fake_embeddings))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{}", addr)
    }

    #[actix_web::test]
    async fn test_embed_via_ollama() {
        let base_url = spawn_fake_ollama();
        let embedder = OllamaEmbedder::new(base_url, "nomic-embed-text", 3).unwrap();

        let embedding = embedder.embed("hello").await.unwrap();
        assert_eq!(embedding, vec![5.0, 6.0, 7.0]);
    }

    #[actix_web::test]
    async fn test_embed_rejects_wrong_dimension() {
        let base_url = spawn_fake_ollama();
        let embedder = OllamaEmbedder::new(base_url, "nomic-embed-text", 3).unwrap();

        let err = embedder.embed("short").await.unwrap_err();
        assert!(matches!(err, BioBlockError::Embedding(_)));
    }

    #[actix_web::test]
    async fn test_empty_text_skips_model() {
        // Nothing listens here; an empty prompt must not reach the network
        let embedder = OllamaEmbedder::new("http://127.0.0.1:9", "nomic-embed-text", 4).unwrap();
        assert_eq!(embedder.embed("").await.unwrap(), vec![0.0; 4]);
        assert_eq!(embedder.embed("   ").await.unwrap(), vec![0.0; 4]);
    }

    #[actix_web::test]
    async fn test_unreachable_server_is_network_error() {
        let embedder = OllamaEmbedder::new("http://127.0.0.1:9", "nomic-embed-text", 4).unwrap();
        let err = embedder.embed("text").await.unwrap_err();
        assert!(matches!(err, BioBlockError::Network(_)));
    }
}
