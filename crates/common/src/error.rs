/// Bio-Block error types
#[derive(Debug, thiserror::Error)]
pub enum BioBlockError {
    /// Embedding model error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector store error
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// Redacted or anonymized workbook could not be written
    #[error("Redaction error: {0}")]
    Redaction(String),

    /// Uploaded spreadsheet could not be parsed
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BioBlockError {
    /// Create embedding error
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create vector store error
    pub fn vector_store<S: Into<String>>(msg: S) -> Self {
        Self::VectorStore(msg.into())
    }

    /// Create redaction error
    pub fn redaction<S: Into<String>>(msg: S) -> Self {
        Self::Redaction(msg.into())
    }

    /// Create spreadsheet error
    pub fn spreadsheet<S: Into<String>>(msg: S) -> Self {
        Self::Spreadsheet(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

impl BioBlockError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            // An unreadable upload is the caller's problem
            Self::Spreadsheet(_) => 400,
            Self::Network(_) => 503,
            Self::Json(_) => 400,
            Self::Embedding(_)
            | Self::VectorStore(_)
            | Self::Redaction(_)
            | Self::Config(_)
            | Self::Internal(_)
            | Self::Io(_)
            | Self::Other(_) => 500,
        }
    }

    /// Whether the error is the caller's fault (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}
