//! Local sentence encoder on candle
//!
//! BERT forward pass, attention-masked mean pooling, then L2 normalisation.

use async_trait::async_trait;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use serde::Deserialize;
use std::sync::Arc;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::{debug, info};
use uiforge_common::{AppConfig, ModelManager, Result, SentenceModelFiles, UiForgeError};

use super::{check_batch, Encoder};
use crate::types::Embedding;

/// Token limit per input (all-MiniLM-L6-v2 was trained on 256)
const MAX_SEQUENCE_LENGTH: usize = 256;

#[derive(Deserialize)]
struct HiddenSize {
    hidden_size: usize,
}

struct SentenceModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

/// Encoder running a BERT sentence model in-process
pub struct CandleEncoder {
    inner: Arc<SentenceModel>,
    model_id: String,
    dimension: usize,
}

impl CandleEncoder {
    /// Download (if needed) and load the configured model
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let manager = ModelManager::new(config.models_dir.clone())?;
        let files = manager.ensure_sentence_model(&config.embedding_model).await?;
        let encoder = Self::load(&files, &config.embedding_model)?;

        if encoder.dimension != config.embedding_dim {
            return Err(UiForgeError::DimensionMismatch {
                expected: config.embedding_dim,
                actual: encoder.dimension,
            });
        }

        Ok(encoder)
    }

    /// Load from local model files
    pub fn load(files: &SentenceModelFiles, model_id: &str) -> Result<Self> {
        let device = Device::Cpu;

        let config_json = std::fs::read_to_string(&files.config)
            .map_err(|e| UiForgeError::setup(format!("Failed to read model config: {}", e)))?;
        let bert_config: BertConfig = serde_json::from_str(&config_json)
            .map_err(|e| UiForgeError::setup(format!("Invalid model config: {}", e)))?;
        let HiddenSize { hidden_size } = serde_json::from_str(&config_json)
            .map_err(|e| UiForgeError::setup(format!("Model config has no hidden_size: {}", e)))?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| UiForgeError::setup(format!("Failed to load tokenizer: {}", e)))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| UiForgeError::setup(format!("Failed to configure tokenizer: {}", e)))?;

        // SAFETY: the weights file is not modified while mapped
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[files.weights.clone()], DTYPE, &device)
        }
        .map_err(|e| UiForgeError::setup(format!("Failed to map model weights: {}", e)))?;

        let model = BertModel::load(vb, &bert_config)
            .map_err(|e| UiForgeError::setup(format!("Failed to load BERT model: {}", e)))?;

        info!("Candle encoder ready: model={}, dimension={}", model_id, hidden_size);

        Ok(Self {
            inner: Arc::new(SentenceModel {
                model,
                tokenizer,
                device,
            }),
            model_id: model_id.to_string(),
            dimension: hidden_size,
        })
    }
}

impl SentenceModel {
    fn embed(&self, texts: Vec<String>) -> std::result::Result<Vec<Embedding>, String> {
        let encodings = self
            .tokenizer
            .encode_batch(texts, true)
            .map_err(|e| format!("Tokenization failed: {}", e))?;

        let ids = encodings
            .iter()
            .map(|e| Tensor::new(e.get_ids(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()
            .map_err(|e| e.to_string())?;
        let masks = encodings
            .iter()
            .map(|e| Tensor::new(e.get_attention_mask(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()
            .map_err(|e| e.to_string())?;

        self.forward(&ids, &masks).map_err(|e| e.to_string())
    }

    fn forward(&self, ids: &[Tensor], masks: &[Tensor]) -> candle_core::Result<Vec<Embedding>> {
        let input_ids = Tensor::stack(ids, 0)?;
        let attention_mask = Tensor::stack(masks, 0)?;
        let token_type_ids = input_ids.zeros_like()?;

        // (batch, seq, hidden)
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // Mean over real tokens only
        let mask = attention_mask.to_dtype(DTYPE)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?;

        let norms = pooled.sqr()?.sum_keepdim(1)?.sqrt()?;
        pooled.broadcast_div(&norms)?.to_vec2::<f32>()
    }
}

#[async_trait]
impl Encoder for CandleEncoder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Encoding {} texts with {}", texts.len(), self.model_id);

        let inner = Arc::clone(&self.inner);
        let batch = texts.to_vec();
        let embeddings = tokio::task::spawn_blocking(move || inner.embed(batch))
            .await
            .map_err(|e| UiForgeError::encoder(format!("Encoder task failed: {}", e)))?
            .map_err(UiForgeError::encoder)?;

        check_batch(texts, &embeddings, self.dimension)?;
        Ok(embeddings)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
