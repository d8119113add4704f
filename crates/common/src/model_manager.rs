//! Model Manager for automatic model downloading
//!
//! Fetches sentence-transformers model files from the Hugging Face hub
//! for the local embedding backend.

use crate::{Result, UiForgeError};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Hugging Face download base URL
const HF_BASE_URL: &str = "https://huggingface.co";

/// Files a sentence-transformers BERT model needs
pub const SENTENCE_MODEL_FILES: [&str; 3] = ["config.json", "tokenizer.json", "model.safetensors"];

/// Local paths of a downloaded sentence model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceModelFiles {
    /// Model configuration (hidden size, layers, ...)
    pub config: PathBuf,

    /// Tokenizer definition
    pub tokenizer: PathBuf,

    /// Weights in safetensors format
    pub weights: PathBuf,
}

impl SentenceModelFiles {
    /// Paths for a model stored in `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config: dir.join(SENTENCE_MODEL_FILES[0]),
            tokenizer: dir.join(SENTENCE_MODEL_FILES[1]),
            weights: dir.join(SENTENCE_MODEL_FILES[2]),
        }
    }

    /// Whether all files are present
    pub fn is_complete(&self) -> bool {
        self.config.exists() && self.tokenizer.exists() && self.weights.exists()
    }
}

/// Model Manager
pub struct ModelManager {
    models_dir: PathBuf,
    client: Client,
}

impl ModelManager {
    /// Create new model manager
    pub fn new(models_dir: PathBuf) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(3600)) // 1 hour for large downloads
            .build()
            .map_err(|e| UiForgeError::setup(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { models_dir, client })
    }

    /// Get default models directory
    pub fn default_models_dir() -> PathBuf {
        // Check environment variable first
        if let Ok(dir) = std::env::var("UIFORGE_MODELS_DIR") {
            return PathBuf::from(dir);
        }

        // Use platform-specific cache directory
        #[cfg(target_os = "linux")]
        {
            if let Some(home) = std::env::var_os("HOME") {
                return PathBuf::from(home)
                    .join(".cache/uiforge/models");
            }
        }

        #[cfg(target_os = "macos")]
        {
            if let Some(home) = std::env::var_os("HOME") {
                return PathBuf::from(home)
                    .join("Library/Caches/uiforge/models");
            }
        }

        #[cfg(target_os = "windows")]
        {
            if let Some(local_app_data) = std::env::var_os("LOCALAPPDATA") {
                return PathBuf::from(local_app_data)
                    .join("uiforge\\models");
            }
        }

        // Fallback
        PathBuf::from("models")
    }

    /// Local directory for a hub repository, e.g. `sentence-transformers/all-MiniLM-L6-v2`
    pub fn model_dir(&self, repo: &str) -> PathBuf {
        self.models_dir.join(repo.replace('/', "--"))
    }

    /// Ensure sentence model files exist, download the missing ones
    pub async fn ensure_sentence_model(&self, repo: &str) -> Result<SentenceModelFiles> {
        if repo.trim().is_empty() || repo.starts_with('/') || repo.contains("..") {
            return Err(UiForgeError::setup(format!("Invalid model repository: '{}'", repo)));
        }

        let dir = self.model_dir(repo);
        let files = SentenceModelFiles::in_dir(&dir);

        if files.is_complete() {
            info!("Model already exists: {}", dir.display());
            return Ok(files);
        }

        info!("Model not found, downloading: {}", repo);

        for name in SENTENCE_MODEL_FILES {
            let dest = dir.join(name);
            if dest.exists() {
                continue;
            }
            let url = format!("{}/{}/resolve/main/{}", HF_BASE_URL, repo, name);
            self.download_file(&url, &dest).await?;
        }

        Ok(files)
    }

    /// Download a file from URL
    pub async fn download_file(&self, url: &str, dest: &Path) -> Result<()> {
        info!("Downloading {} -> {}", url, dest.display());

        // Create directory
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UiForgeError::setup(format!("Failed to download {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(UiForgeError::setup(format!(
                "Download of {} failed with status: {}",
                url,
                response.status()
            )));
        }

        // Create progress bar
        let pb = ProgressBar::new(response.content_length().unwrap_or(0));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        // Write to temporary file first
        let temp_path = dest.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        use futures::StreamExt;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| UiForgeError::setup(format!("Download error: {}", e)))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }

        pb.finish_with_message("Download complete");
        file.sync_all().await?;
        drop(file);

        if downloaded == 0 {
            fs::remove_file(&temp_path).await?;
            return Err(UiForgeError::setup(format!("Downloaded file is empty: {}", url)));
        }

        // Rename to final destination
        fs::rename(&temp_path, dest).await?;

        info!("Download successful: {}", dest.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_dir() {
        let manager = ModelManager::new(PathBuf::from("/tmp/models")).unwrap();
        assert_eq!(
            manager.model_dir("sentence-transformers/all-MiniLM-L6-v2"),
            PathBuf::from("/tmp/models/sentence-transformers--all-MiniLM-L6-v2")
        );
    }

    #[test]
    fn test_sentence_model_files() {
        let files = SentenceModelFiles::in_dir(Path::new("m"));
        assert_eq!(files.config, PathBuf::from("m/config.json"));
        assert_eq!(files.tokenizer, PathBuf::from("m/tokenizer.json"));
        assert_eq!(files.weights, PathBuf::from("m/model.safetensors"));
        assert!(!files.is_complete());
    }

    #[tokio::test]
    async fn test_ensure_existing_model_skips_download() {
        let temp = tempfile::tempdir().unwrap();
        let manager = ModelManager::new(temp.path().to_path_buf()).unwrap();
        let dir = manager.model_dir("org/model");
        std::fs::create_dir_all(&dir).unwrap();
        for name in SENTENCE_MODEL_FILES {
            std::fs::write(dir.join(name), b"{}").unwrap();
        }

        let files = manager.ensure_sentence_model("org/model").await.unwrap();
        assert!(files.is_complete());
    }

    #[tokio::test]
    async fn test_invalid_repository_is_setup_error() {
        let manager = ModelManager::new(PathBuf::from("models")).unwrap();
        let err = manager.ensure_sentence_model("../escape").await.unwrap_err();
        assert!(matches!(err, UiForgeError::Setup(_)));
    }

    #[test]
    fn test_default_models_dir() {
        let dir = ModelManager::default_models_dir();
        assert!(!dir.to_string_lossy().is_empty());
    }
}
