use serde::{Deserialize, Serialize};

/// Ollama batch embedding request (`/api/embed`)
#[derive(Debug, Clone, Serialize)]
pub struct EmbedRequest {
    /// Model name (e.g., "all-minilm", "nomic-embed-text")
    pub model: String,

    /// Texts to embed, in order
    pub input: Vec<String>,
}

/// Ollama batch embedding response
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedResponse {
    /// Model name
    #[serde(default)]
    pub model: String,

    /// One embedding per input, same order
    pub embeddings: Vec<Vec<f32>>,
}

/// Installed model entry from `/api/tags`
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    /// Model name with tag (e.g., "all-minilm:latest")
    pub name: String,

    /// Size on disk in bytes
    #[serde(default)]
    pub size: Option<u64>,
}

impl ModelInfo {
    /// Whether this entry is the requested model; an untagged request matches `:latest`
    pub fn matches(&self, model: &str) -> bool {
        if self.name == model {
            return true;
        }
        !model.contains(':') && self.name == format!("{}:latest", model)
    }
}

/// Installed models listing
#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}
