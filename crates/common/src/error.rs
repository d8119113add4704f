use std::path::PathBuf;

/// UiForge error types
#[derive(Debug, thiserror::Error)]
pub enum UiForgeError {
    /// Encoder model could not be obtained or initialized
    #[error("Setup error: {0}")]
    Setup(String),

    /// Embedding dimension differs from the one the index was built with
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Index and metadata row counts disagree
    #[error("Artifact mismatch: index has {index_rows} rows, metadata has {metadata_rows}")]
    ArtifactMismatch {
        index_rows: usize,
        metadata_rows: usize,
    },

    /// Persisted index or metadata file is absent
    #[error("Missing artifact: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// Embedding inference error
    #[error("Encoder error: {0}")]
    Encoder(String),

    /// Vector index error (corrupt file, bad build input)
    #[error("Index error: {0}")]
    Index(String),

    /// Component catalog error
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UiForgeError {
    /// Create setup error
    pub fn setup<S: Into<String>>(msg: S) -> Self {
        Self::Setup(msg.into())
    }

    /// Create encoder error
    pub fn encoder<S: Into<String>>(msg: S) -> Self {
        Self::Encoder(msg.into())
    }

    /// Create index error
    pub fn index<S: Into<String>>(msg: S) -> Self {
        Self::Index(msg.into())
    }

    /// Create catalog error
    pub fn catalog<S: Into<String>>(msg: S) -> Self {
        Self::Catalog(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }

    /// Create serialization error
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create missing artifact error
    pub fn missing_artifact(path: impl Into<PathBuf>) -> Self {
        Self::MissingArtifact(path.into())
    }
}

impl UiForgeError {
    /// Whether the persisted knowledge base must be regenerated to recover
    pub fn needs_rebuild(&self) -> bool {
        matches!(
            self,
            Self::MissingArtifact(_) | Self::DimensionMismatch { .. } | Self::ArtifactMismatch { .. }
        )
    }
}
