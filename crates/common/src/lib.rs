pub mod config;
pub mod error;
pub mod logger;

// Re-export commonly used types
pub use config::{AppConfig, EmbeddingBackend, IdScheme};
pub use error::BioBlockError;
pub type Result<T> = std::result::Result<T, BioBlockError>;
