use std::sync::Arc;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use crate::error::EmbedError;
use crate::l2_normalize;
use crate::provider::EmbeddingProvider;

/// BERT position embedding limit; longer inputs are truncated.
const MAX_TOKENS: usize = 512;

/// Sentence-transformers BERT model run on CPU through candle.
#[derive(Clone)]
pub struct BertEmbedder {
    model: Arc<BertModel>,
    tokenizer: Arc<Tokenizer>,
    device: Device,
    dimension: usize,
    repo_id: String,
}

impl std::fmt::Debug for BertEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertEmbedder")
            .field("repo_id", &self.repo_id)
            .field("dimension", &self.dimension)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl BertEmbedder {
    /// Load a BERT embedding model from the `HuggingFace` Hub.
    ///
    /// # Errors
    ///
    /// Returns an error if model download or loading fails.
    pub fn load(repo_id: &str) -> Result<Self, EmbedError> {
        let device = Device::Cpu;
        let api = hf_hub::api::sync::Api::new().map_err(|e| {
            EmbedError::ModelLoad(format!("failed to create HuggingFace API client: {e}"))
        })?;
        let repo = api.model(repo_id.to_owned());

        let config_path = repo.get("config.json").map_err(|e| {
            EmbedError::ModelLoad(format!(
                "failed to download config.json from {repo_id}: {e}"
            ))
        })?;
        let tokenizer_path = repo.get("tokenizer.json").map_err(|e| {
            EmbedError::ModelLoad(format!(
                "failed to download tokenizer.json from {repo_id}: {e}"
            ))
        })?;
        let weights_path = repo.get("model.safetensors").map_err(|e| {
            EmbedError::ModelLoad(format!(
                "failed to download model.safetensors from {repo_id}: {e}"
            ))
        })?;

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| EmbedError::ModelLoad(format!("failed to read BERT config: {e}")))?;
        let config: BertConfig = serde_json::from_str(&config_str)?;
        let dimension = hidden_size(&config_str)?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| EmbedError::ModelLoad(format!("failed to load tokenizer: {e}")))?;

        // SAFETY: file is a valid safetensors downloaded from hf-hub, not modified during
        // VarBuilder lifetime
        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)? };

        let model = BertModel::load(vb, &config)?;
        tracing::info!("loaded embedding model {repo_id} ({dimension} dimensions)");

        Ok(Self {
            model: Arc::new(model),
            tokenizer: Arc::new(tokenizer),
            device,
            dimension,
            repo_id: repo_id.to_owned(),
        })
    }

    /// Mean-pooled, L2-normalized sentence embedding.
    ///
    /// # Errors
    ///
    /// Returns an error if tokenization or the model forward pass fails.
    pub fn embed_sync(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbedError::Inference(format!("tokenizer encode failed: {e}")))?;

        let token_ids = truncate_ids(encoding.get_ids());
        let token_type_ids: Vec<u32> = vec![0; token_ids.len()];

        let input_ids = Tensor::new(token_ids.as_slice(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::new(token_type_ids.as_slice(), &self.device)?.unsqueeze(0)?;

        let embeddings = self.model.forward(&input_ids, &token_type_ids, None)?;

        // Mean pooling over sequence dimension
        let seq_len = embeddings.dim(1)?;
        let sum = embeddings.sum(1)?;
        let mean_pooled = (sum
            / f64::from(
                u32::try_from(seq_len)
                    .map_err(|e| EmbedError::Inference(format!("sequence length overflow: {e}")))?,
            ))?;

        let mut vector = mean_pooled.squeeze(0)?.to_vec1::<f32>()?;
        l2_normalize(&mut vector);

        if vector.len() != self.dimension {
            return Err(EmbedError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}

/// Keep the leading tokens and the trailing `[SEP]` when input exceeds the model limit.
fn truncate_ids(ids: &[u32]) -> Vec<u32> {
    if ids.len() <= MAX_TOKENS {
        return ids.to_vec();
    }
    let mut out = ids[..MAX_TOKENS - 1].to_vec();
    if let Some(last) = ids.last() {
        out.push(*last);
    }
    out
}

fn hidden_size(config_json: &str) -> Result<usize, EmbedError> {
    let value: serde_json::Value = serde_json::from_str(config_json)?;
    value
        .get("hidden_size")
        .and_then(serde_json::Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| EmbedError::ModelLoad("BERT config has no hidden_size".into()))
}

impl EmbeddingProvider for BertEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let model = self.clone();
        let text = text.to_owned();
        tokio::task::spawn_blocking(move || model.embed_sync(&text))
            .await
            .map_err(|e| EmbedError::Inference(format!("candle embedding task failed: {e}")))?
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "candle"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_input_unchanged() {
        assert_eq!(truncate_ids(&[101, 7, 102]), vec![101, 7, 102]);
    }

    #[test]
    fn truncate_keeps_trailing_separator() {
        let ids: Vec<u32> = (0..600).collect();
        let out = truncate_ids(&ids);
        assert_eq!(out.len(), MAX_TOKENS);
        assert_eq!(out[0], 0);
        assert_eq!(*out.last().unwrap(), 599);
    }

    #[test]
    fn hidden_size_parsed() {
        assert_eq!(hidden_size(r#"{"hidden_size": 384}"#).unwrap(), 384);
    }

    #[test]
    fn hidden_size_missing_errors() {
        assert!(hidden_size("{}").is_err());
    }
}
