//! UiForge Ollama Integration
//!
//! Ollama API client for text embeddings

mod client;
mod types;

pub use client::OllamaClient;
pub use types::{EmbedRequest, EmbedResponse, ModelInfo, TagsResponse};
