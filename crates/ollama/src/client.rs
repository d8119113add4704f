use reqwest::Client;
use tracing::{debug, info};
use uiforge_common::{Result, UiForgeError};

use crate::types::{EmbedRequest, EmbedResponse, ModelInfo, TagsResponse};

/// Ollama API client
///
/// Requests are single attempts; callers decide whether a failure is worth retrying.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    client: Client,
}

impl OllamaClient {
    /// Create new Ollama client
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300)) // 5 minutes for large batches
            .build()
            .map_err(|e| UiForgeError::network(format!("Failed to create HTTP client: {}", e)))?;

        info!("Ollama client initialized: {}", base_url);
        Ok(Self { base_url, client })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Test connection to Ollama
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().await
            .map_err(|e| UiForgeError::network(format!("Failed to connect to Ollama: {}", e)))?;
        Ok(response.status().is_success())
    }

    /// List locally installed models
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UiForgeError::network(format!("Failed to connect to Ollama: {}", e)))?
            .error_for_status()
            .map_err(|e| UiForgeError::network(format!("Ollama API error: {}", e)))?;

        let tags: TagsResponse = response.json().await
            .map_err(|e| UiForgeError::serialization(format!("Failed to parse model list: {}", e)))?;

        debug!("Ollama reports {} installed models", tags.models.len());
        Ok(tags.models)
    }

    /// Generate embeddings for a batch of texts, one vector per input in order
    pub async fn embed_batch(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.base_url);

        debug!("Generating embeddings - Model: {}, Texts: {}", model, texts.len());

        let request = EmbedRequest {
            model: model.to_string(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| UiForgeError::network(format!("Failed to send embedding request: {}", e)))?
            .error_for_status()
            .map_err(|e| UiForgeError::encoder(format!("Ollama embedding API error: {}", e)))?;

        let result: EmbedResponse = response.json().await
            .map_err(|e| UiForgeError::serialization(format!("Failed to parse embedding response: {}", e)))?;

        if result.embeddings.len() != texts.len() {
            return Err(UiForgeError::encoder(format!(
                "Mismatch between request and response counts: {} vs {}",
                texts.len(),
                result.embeddings.len()
            )));
        }

        if result.embeddings.iter().any(Vec::is_empty) {
            return Err(UiForgeError::encoder("Empty embedding from Ollama"));
        }

        debug!(
            "Received embeddings - Dimension: {}",
            result.embeddings.first().map_or(0, Vec::len)
        );
        Ok(result.embeddings)
    }
}
