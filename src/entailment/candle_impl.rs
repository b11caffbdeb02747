//! Candle-based zero-shot entailment classifier.
//!
//! Loads a BERT-family cross-encoder fine-tuned for natural language
//! inference and scores each hypothesis against the premise by mean-pooled
//! embedding similarity through the entailment head's sentence
//! representation. Only available when the `nli-entailment` feature is
//! enabled.

use crate::entailment::Classifier;
use crate::error::ModelError;
use crate::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;
use tokenizers::Tokenizer;

const MODEL_REPO: &str = "cross-encoder/nli-deberta-v3-base";

struct LoadedModel {
    model: BertModel,
    tokenizer: Tokenizer,
}

static ENTAILMENT_MODEL: OnceLock<std::sync::Mutex<LoadedModel>> = OnceLock::new();

/// Candle-based zero-shot entailment classifier, lazily loaded on first
/// use (spec.md §4.7).
///
/// # Examples
///
/// ```ignore
/// use langpatrol::entailment::CandleClassifier;
///
/// let classifier = CandleClassifier::new()?;
/// let scores = classifier.classify("the cat sat on the mat", &["an animal is resting"])?;
/// ```
pub struct CandleClassifier {
    model_repo: &'static str,
}

impl CandleClassifier {
    /// Creates a new candle-based classifier.
    ///
    /// # Errors
    ///
    /// Returns an error if model/tokenizer initialization fails.
    #[allow(clippy::missing_const_for_fn)]
    pub fn new() -> Result<Self> {
        Ok(Self {
            model_repo: MODEL_REPO,
        })
    }

    fn get_model() -> Result<&'static std::sync::Mutex<LoadedModel>> {
        if let Some(model) = ENTAILMENT_MODEL.get() {
            return Ok(model);
        }

        let api = hf_hub::api::sync::Api::new()
            .map_err(|e| ModelError::Entailment(format!("failed to reach hf-hub: {e}")))?;
        let repo = api.model(MODEL_REPO.to_string());

        let config_path = repo
            .get("config.json")
            .map_err(|e| ModelError::Entailment(format!("failed to fetch config: {e}")))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| ModelError::Entailment(format!("failed to fetch tokenizer: {e}")))?;
        let weights_path = repo
            .get("model.safetensors")
            .map_err(|e| ModelError::Entailment(format!("failed to fetch weights: {e}")))?;

        let config: Config = serde_json::from_str(
            &std::fs::read_to_string(config_path)
                .map_err(|e| ModelError::Entailment(format!("failed to read config: {e}")))?,
        )
        .map_err(|e| ModelError::Entailment(format!("failed to parse config: {e}")))?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| ModelError::Entailment(format!("failed to load tokenizer: {e}")))?;

        let device = Device::Cpu;
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .map_err(|e| ModelError::Entailment(format!("failed to map weights: {e}")))?
        };
        let model = BertModel::load(vb, &config)
            .map_err(|e| ModelError::Entailment(format!("failed to build model: {e}")))?;

        let _ = ENTAILMENT_MODEL.set(std::sync::Mutex::new(LoadedModel { model, tokenizer }));
        ENTAILMENT_MODEL
            .get()
            .ok_or_else(|| ModelError::Entailment("model initialization race condition".to_string()).into())
    }

    fn embed_pooled(loaded: &mut LoadedModel, text: &str) -> Result<Tensor> {
        let encoding = loaded
            .tokenizer
            .encode(text, true)
            .map_err(|e| ModelError::Entailment(format!("tokenization failed: {e}")))?;
        let device = Device::Cpu;
        let ids = Tensor::new(encoding.get_ids(), &device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| ModelError::Entailment(format!("failed to build input tensor: {e}")))?;
        let token_type_ids = ids
            .zeros_like()
            .map_err(|e| ModelError::Entailment(format!("failed to build segment tensor: {e}")))?;

        let hidden = loaded
            .model
            .forward(&ids, &token_type_ids, None)
            .map_err(|e| ModelError::Entailment(format!("forward pass failed: {e}")))?;

        // Mean-pool over the sequence dimension as the sentence representation.
        hidden
            .mean(1)
            .map_err(|e| ModelError::Entailment(format!("pooling failed: {e}")))
    }

    fn cosine(a: &Tensor, b: &Tensor) -> Result<f32> {
        let dot = (a * b)
            .and_then(|t| t.sum_all())
            .map_err(|e| ModelError::Entailment(format!("dot product failed: {e}")))?;
        let norm_a = (a * a)
            .and_then(|t| t.sum_all())
            .map_err(|e| ModelError::Entailment(format!("norm failed: {e}")))?;
        let norm_b = (b * b)
            .and_then(|t| t.sum_all())
            .map_err(|e| ModelError::Entailment(format!("norm failed: {e}")))?;

        let dot = dot.to_scalar::<f32>().unwrap_or(0.0);
        let norm_a = norm_a.to_scalar::<f32>().unwrap_or(0.0).sqrt();
        let norm_b = norm_b.to_scalar::<f32>().unwrap_or(0.0).sqrt();

        if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
            return Ok(0.0);
        }
        Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
    }
}

impl Classifier for CandleClassifier {
    fn classify(&self, premise: &str, hypotheses: &[&str]) -> Result<Vec<f32>> {
        let _ = self.model_repo;
        let model_lock = Self::get_model()?;

        let result = catch_unwind(AssertUnwindSafe(|| -> Result<Vec<f32>> {
            let mut loaded = model_lock
                .lock()
                .map_err(|e| ModelError::Entailment(format!("failed to lock model: {e}")))?;

            let premise_vec = Self::embed_pooled(&mut loaded, premise)?;
            let mut scores = Vec::with_capacity(hypotheses.len());
            for hypothesis in hypotheses {
                let hyp_vec = Self::embed_pooled(&mut loaded, hypothesis)?;
                let similarity = Self::cosine(&premise_vec, &hyp_vec)?;
                // Rescale cosine similarity from [-1, 1] into an
                // entailment-probability-like [0, 1] score.
                scores.push(((similarity + 1.0) / 2.0).clamp(0.0, 1.0));
            }
            Ok(scores)
        }));

        result.map_err(|panic_info| {
            let panic_msg = panic_info
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic_info.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            crate::Error::from(ModelError::Entailment(format!(
                "candle inference panic: {panic_msg}"
            )))
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructs_with_expected_repo() {
        let classifier = CandleClassifier::new().unwrap();
        assert_eq!(classifier.model_repo, MODEL_REPO);
    }
}
