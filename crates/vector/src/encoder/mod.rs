//! Text encoders: text in, fixed-length embedding out
//!
//! Backends:
//! - `ollama` (default feature): batch `/api/embed` on an Ollama server
//! - `candle`: local BERT sentence model (all-MiniLM-L6-v2 style pooling)

use async_trait::async_trait;
use std::sync::Arc;
use uiforge_common::{AppConfig, Result, UiForgeError};

use crate::types::Embedding;

#[cfg(feature = "candle")]
mod candle;
#[cfg(feature = "ollama")]
mod ollama;

#[cfg(feature = "candle")]
pub use self::candle::CandleEncoder;
#[cfg(feature = "ollama")]
pub use self::ollama::OllamaEncoder;

/// Common trait for text encoders
///
/// Implementations are deterministic for a fixed model: the same text always
/// yields the same vector within one runtime.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Encode a batch, one embedding per input in the same order
    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Model identifier recorded in the index header
    fn model_id(&self) -> &str;

    /// Output dimension
    fn dimension(&self) -> usize;

    /// Encode a single text
    async fn encode_one(&self, text: &str) -> Result<Embedding> {
        self.encode(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| UiForgeError::encoder("encoder returned no embeddings"))
    }
}

/// Check a backend's output against its inputs and declared dimension
pub fn check_batch(texts: &[String], embeddings: &[Embedding], dimension: usize) -> Result<()> {
    if embeddings.len() != texts.len() {
        return Err(UiForgeError::encoder(format!(
            "Mismatch between input and embedding counts: {} vs {}",
            texts.len(),
            embeddings.len()
        )));
    }

    if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension) {
        return Err(UiForgeError::DimensionMismatch {
            expected: dimension,
            actual: bad.len(),
        });
    }

    Ok(())
}

/// Create the encoder selected by `embedding_backend`
///
/// Fails with a setup error if the model cannot be reached or loaded.
pub async fn encoder_from_config(config: &AppConfig) -> Result<Arc<dyn Encoder>> {
    match config.embedding_backend.as_str() {
        #[cfg(feature = "ollama")]
        "ollama" => Ok(Arc::new(OllamaEncoder::connect(config).await?)),
        #[cfg(feature = "candle")]
        "candle" => Ok(Arc::new(CandleEncoder::from_config(config).await?)),
        other => Err(UiForgeError::config(format!(
            "Embedding backend '{}' is not available in this build",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEncoder;

    #[async_trait]
    impl Encoder for FixedEncoder {
        async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn model_id(&self) -> &str {
            "fixed"
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn test_encode_one() {
        let embedding = FixedEncoder.encode_one("abc").await.unwrap();
        assert_eq!(embedding, vec![3.0, 1.0]);
    }

    #[test]
    fn test_check_batch() {
        let texts = vec!["a".to_string(), "b".to_string()];
        assert!(check_batch(&texts, &[vec![0.0; 3], vec![0.0; 3]], 3).is_ok());
        assert!(matches!(
            check_batch(&texts, &[vec![0.0; 3]], 3).unwrap_err(),
            UiForgeError::Encoder(_)
        ));
        assert!(matches!(
            check_batch(&texts, &[vec![0.0; 3], vec![0.0; 4]], 3).unwrap_err(),
            UiForgeError::DimensionMismatch { expected: 3, actual: 4 }
        ));
    }

    #[tokio::test]
    async fn test_unknown_backend_is_config_error() {
        let config = AppConfig {
            embedding_backend: "faiss".to_string(),
            ..AppConfig::default()
        };
        let err = encoder_from_config(&config).await.err().unwrap();
        assert!(matches!(err, UiForgeError::Config(_)));
    }
}
