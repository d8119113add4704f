//! Deterministic encoders and fixtures for unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use uiforge_common::Result;

use crate::encoder::Encoder;
use crate::types::{ComponentRecord, Embedding};

pub fn component(id: &str, name: &str) -> ComponentRecord {
    ComponentRecord {
        component_id: id.to_string(),
        name: name.to_string(),
        category: "UI Components".to_string(),
        description: format!("{} component", name),
        code_snippet: format!("<div>{}</div>", name),
        use_cases: "Testing".to_string(),
    }
}

/// Hands out fixed vectors: catalog texts by position, queries by exact text
pub struct ToyEncoder {
    vectors: Vec<Embedding>,
    queries: HashMap<String, Embedding>,
    truncate: bool,
    calls: AtomicUsize,
}

impl ToyEncoder {
    pub fn new(vectors: Vec<Embedding>) -> Self {
        Self {
            vectors,
            queries: HashMap::new(),
            truncate: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_query(mut self, text: &str, embedding: Embedding) -> Self {
        self.queries.insert(text.to_string(), embedding);
        self
    }

    /// Return the configured vectors as-is, whatever the batch size
    pub fn truncating(mut self) -> Self {
        self.truncate = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Encoder for ToyEncoder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.truncate {
            return Ok(self.vectors.clone());
        }

        Ok(texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                self.queries
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| self.vectors[i % self.vectors.len()].clone())
            })
            .collect())
    }

    fn model_id(&self) -> &str {
        "toy"
    }

    fn dimension(&self) -> usize {
        self.vectors.first().map_or(0, Vec::len)
    }
}
