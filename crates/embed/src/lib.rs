//! Bio-Block embedding models
//!
//! Text to fixed-length vector, behind the [`Embedder`] trait.

mod embedder;
mod hashing;
mod ollama;
mod types;

pub use embedder::{build_embedder, Embedder};
pub use hashing::HashingEmbedder;
pub use ollama::OllamaEmbedder;
pub use types::{EmbedRequest, EmbedResponse};
