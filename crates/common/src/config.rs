use crate::error::UiForgeError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Supported embedding backends
pub const EMBEDDING_BACKENDS: &[&str] = &["ollama", "candle"];

/// Default model for a backend: Ollama tag or Hugging Face repository
pub fn default_embedding_model(backend: &str) -> &'static str {
    match backend {
        "candle" => "sentence-transformers/all-MiniLM-L6-v2",
        _ => "all-minilm",
    }
}

/// UiForge application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Data base path
    pub data_dir: PathBuf,

    /// Component catalog snapshot (JSON)
    pub catalog_path: PathBuf,

    /// Vector index file path
    pub index_path: PathBuf,

    /// Metadata file path
    pub metadata_path: PathBuf,

    /// Generated page directory
    pub output_dir: PathBuf,

    /// Downloaded model files directory
    pub models_dir: PathBuf,

    /// Embedding backend ("ollama" or "candle")
    pub embedding_backend: String,

    /// Embedding model name
    pub embedding_model: String,

    /// Expected embedding dimension
    pub embedding_dim: usize,

    /// Ollama API base URL
    pub ollama_base_url: String,

    /// Number of components retrieved per request
    pub top_k: usize,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            catalog_path: PathBuf::from("./data/processed/components.json"),
            index_path: PathBuf::from("./data/embeddings/components_index.bin"),
            metadata_path: PathBuf::from("./data/embeddings/metadata.json"),
            output_dir: PathBuf::from("./generated"),
            models_dir: crate::model_manager::ModelManager::default_models_dir(),
            embedding_backend: "ollama".to_string(),
            embedding_model: default_embedding_model("ollama").to_string(),
            embedding_dim: 384,
            ollama_base_url: "http://localhost:11434".to_string(),
            top_k: 5,
            log_dir: PathBuf::from("./data/log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, UiForgeError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();
        let data_dir = Self::get_env_path("UIFORGE_DATA_DIR").unwrap_or(defaults.data_dir);
        let embedding_backend = std::env::var("UIFORGE_EMBEDDING_BACKEND")
            .unwrap_or(defaults.embedding_backend);

        let config = Self {
            catalog_path: Self::get_env_path("UIFORGE_CATALOG_PATH")
                .unwrap_or_else(|| data_dir.join("processed/components.json")),
            index_path: Self::get_env_path("UIFORGE_INDEX_PATH")
                .unwrap_or_else(|| data_dir.join("embeddings/components_index.bin")),
            metadata_path: Self::get_env_path("UIFORGE_METADATA_PATH")
                .unwrap_or_else(|| data_dir.join("embeddings/metadata.json")),
            log_dir: Self::get_env_path("UIFORGE_LOG_DIR").unwrap_or_else(|| data_dir.join("log")),
            output_dir: Self::get_env_path("UIFORGE_OUTPUT_DIR").unwrap_or(defaults.output_dir),
            models_dir: Self::get_env_path("UIFORGE_MODELS_DIR").unwrap_or(defaults.models_dir),
            embedding_model: std::env::var("UIFORGE_EMBEDDING_MODEL")
                .unwrap_or_else(|_| default_embedding_model(&embedding_backend).to_string()),
            embedding_dim: Self::get_env_number("UIFORGE_EMBEDDING_DIM")
                .unwrap_or(defaults.embedding_dim),
            ollama_base_url: std::env::var("UIFORGE_OLLAMA_BASE_URL")
                .unwrap_or(defaults.ollama_base_url),
            top_k: Self::get_env_number("UIFORGE_TOP_K").unwrap_or(defaults.top_k),
            log_level: std::env::var("UIFORGE_LOG_LEVEL").unwrap_or(defaults.log_level),
            embedding_backend,
            data_dir,
        };

        Ok(config)
    }

    /// Get PathBuf from environment variable
    fn get_env_path(key: &str) -> Option<PathBuf> {
        std::env::var(key).ok().map(PathBuf::from)
    }

    /// Get a number from environment variable, ignoring unparsable values
    fn get_env_number(key: &str) -> Option<usize> {
        std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
    }

    /// Ensure required directories exist, create if not
    pub fn ensure_directories(&self) -> Result<(), UiForgeError> {
        let mut dirs: Vec<&Path> = vec![&self.data_dir, &self.output_dir, &self.log_dir];
        for file in [&self.catalog_path, &self.index_path, &self.metadata_path] {
            if let Some(parent) = file.parent() {
                dirs.push(parent);
            }
        }

        for dir in dirs {
            if dir.as_os_str().is_empty() || dir.exists() {
                continue;
            }
            std::fs::create_dir_all(dir).map_err(|e| {
                UiForgeError::config(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), UiForgeError> {
        if self.embedding_model.trim().is_empty() {
            return Err(UiForgeError::config("Embedding model name cannot be empty"));
        }

        if self.embedding_dim == 0 {
            return Err(UiForgeError::config("Embedding dimension must be positive"));
        }

        if self.top_k == 0 {
            return Err(UiForgeError::config("top_k must be positive"));
        }

        if !EMBEDDING_BACKENDS.contains(&self.embedding_backend.as_str()) {
            return Err(UiForgeError::config(format!(
                "Unknown embedding backend '{}' (expected one of {:?})",
                self.embedding_backend, EMBEDDING_BACKENDS
            )));
        }

        if !self.ollama_base_url.starts_with("http://")
            && !self.ollama_base_url.starts_with("https://") {
            return Err(UiForgeError::config(
                "Ollama base URL must start with http:// or https://"
            ));
        }

        Ok(())
    }
}
