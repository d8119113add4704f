use async_trait::async_trait;
use tracing::{debug, info};
use uiforge_common::{AppConfig, Result, UiForgeError};
use uiforge_ollama::OllamaClient;

use super::{check_batch, Encoder};
use crate::types::Embedding;

/// Encoder backed by an Ollama server
pub struct OllamaEncoder {
    client: OllamaClient,
    model: String,
    dimension: usize,
}

impl OllamaEncoder {
    /// Connect and verify the model is installed
    ///
    /// Any failure here is a setup error; nothing is retried.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let client = OllamaClient::new(&config.ollama_base_url)?;

        let reachable = client.test_connection().await.map_err(|e| {
            UiForgeError::setup(format!(
                "Ollama server at {} is not reachable: {}",
                client.base_url(),
                e
            ))
        })?;
        if !reachable {
            return Err(UiForgeError::setup(format!(
                "Ollama server at {} did not answer /api/tags",
                client.base_url()
            )));
        }

        let models = client
            .list_models()
            .await
            .map_err(|e| UiForgeError::setup(format!("Failed to list Ollama models: {}", e)))?;

        if !models.iter().any(|m| m.matches(&config.embedding_model)) {
            let available: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
            return Err(UiForgeError::setup(format!(
                "Embedding model '{}' is not installed (run `ollama pull {}`). Available: {:?}",
                config.embedding_model, config.embedding_model, available
            )));
        }

        info!(
            "Ollama encoder ready: model={}, dimension={}",
            config.embedding_model, config.embedding_dim
        );

        Ok(Self {
            client,
            model: config.embedding_model.clone(),
            dimension: config.embedding_dim,
        })
    }
}

#[async_trait]
impl Encoder for OllamaEncoder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        debug!("Encoding {} texts with {}", texts.len(), self.model);
        let embeddings = self.client.embed_batch(&self.model, texts).await?;
        check_batch(texts, &embeddings, self.dimension)?;
        Ok(embeddings)
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
