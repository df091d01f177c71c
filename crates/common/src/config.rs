use crate::error::BioBlockError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Which embedding model implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Remote Ollama server (`/api/embeddings`)
    Ollama,
    /// Offline feature-hashing embedder
    Hashing,
}

impl FromStr for EmbeddingBackend {
    type Err = BioBlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "hashing" | "hash" => Ok(Self::Hashing),
            other => Err(BioBlockError::config(format!(
                "Unknown embedding backend '{}' (expected ollama or hashing)",
                other
            ))),
        }
    }
}

/// Record identifier scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    /// `<millis><4-digit suffix>`, best-effort unique
    Timestamp,
    /// Random 128-bit UUID
    Uuid,
}

impl FromStr for IdScheme {
    type Err = BioBlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "timestamp" => Ok(Self::Timestamp),
            "uuid" => Ok(Self::Uuid),
            other => Err(BioBlockError::config(format!(
                "Unknown id scheme '{}' (expected timestamp or uuid)",
                other
            ))),
        }
    }
}

/// Bio-Block service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database base path (collection files live here)
    pub db_base_path: PathBuf,

    /// Name of the collection holding every record of this instance
    pub collection_name: String,

    /// Embedding backend
    pub embedding_backend: EmbeddingBackend,

    /// Ollama API base URL
    pub ollama_base_url: String,

    /// Embedding model name
    pub embedding_model: String,

    /// Embedding vector length
    pub embedding_dim: usize,

    /// Identifier scheme for stored records
    pub id_scheme: IdScheme,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,

    /// Maximum accepted spreadsheet upload or JSON body size in bytes
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_base_path: PathBuf::from("./db"),
            collection_name: "new_user_data".to_string(),
            embedding_backend: EmbeddingBackend::Ollama,
            ollama_base_url: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_dim: 768,
            id_scheme: IdScheme::Timestamp,
            server_host: "0.0.0.0".to_string(),
            server_port: 3002,
            log_dir: PathBuf::from("./db/log"),
            log_level: "info".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, BioBlockError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();

        let config = Self {
            db_base_path: Self::get_env_path("DB_BASE_PATH")
                .unwrap_or(defaults.db_base_path),
            collection_name: std::env::var("COLLECTION_NAME")
                .unwrap_or(defaults.collection_name),
            embedding_backend: match std::env::var("EMBEDDING_BACKEND") {
                Ok(s) => s.parse()?,
                Err(_) => defaults.embedding_backend,
            },
            ollama_base_url: std::env::var("OLLAMA_BASE_URL")
                .unwrap_or(defaults.ollama_base_url),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model),
            embedding_dim: Self::get_env_parsed("EMBEDDING_DIM")
                .unwrap_or(defaults.embedding_dim),
            id_scheme: match std::env::var("ID_SCHEME") {
                Ok(s) => s.parse()?,
                Err(_) => defaults.id_scheme,
            },
            server_host: std::env::var("SERVER_HOST")
                .unwrap_or(defaults.server_host),
            server_port: Self::get_env_parsed("SERVER_PORT")
                .unwrap_or(defaults.server_port),
            log_dir: Self::get_env_path("LOG_DIR")
                .unwrap_or(defaults.log_dir),
            log_level: std::env::var("LOG_LEVEL")
                .unwrap_or(defaults.log_level),
            max_upload_bytes: Self::get_env_parsed("MAX_UPLOAD_BYTES")
                .unwrap_or(defaults.max_upload_bytes),
        };

        config.validate()?;

        // Ensure required directories exist
        config.ensure_directories()?;

        Ok(config)
    }

    /// Get PathBuf from environment variable
    fn get_env_path(key: &str) -> Option<PathBuf> {
        std::env::var(key).ok().map(PathBuf::from)
    }

    fn get_env_parsed<T: FromStr>(key: &str) -> Option<T> {
        std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
    }

    /// Ensure required directories exist, create if not
    pub fn ensure_directories(&self) -> Result<(), BioBlockError> {
        for dir in [&self.db_base_path, &self.log_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    BioBlockError::config(format!(
                        "Failed to create directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(())
    }

    /// Path of the persisted collection file
    pub fn collection_path(&self) -> PathBuf {
        self.db_base_path
            .join(format!("{}.json", self.collection_name))
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), BioBlockError> {
        if self.collection_name.trim().is_empty() {
            return Err(BioBlockError::config("Collection name cannot be empty"));
        }

        if self.embedding_model.is_empty() {
            return Err(BioBlockError::config("Embedding model name cannot be empty"));
        }

        if self.embedding_dim == 0 {
            return Err(BioBlockError::config("Embedding dimension cannot be 0"));
        }

        // Validate Ollama URL
        if self.embedding_backend == EmbeddingBackend::Ollama
            && !self.ollama_base_url.starts_with("http://")
            && !self.ollama_base_url.starts_with("https://") {
            return Err(BioBlockError::config(
                "Ollama base URL must start with http:// or https://"
            ));
        }

        // Validate port range
        if self.server_port == 0 {
            return Err(BioBlockError::config("Server port cannot be 0"));
        }

        Ok(())
    }
}
