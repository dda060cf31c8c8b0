//! Run exported classifiers with Candle, without Burn or libtorch

use std::path::Path;

use candle_core::{DType, Device, IndexOp, Module, Tensor, D};
use candle_nn::{Linear, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use crate::{
    export::{config::PortableConfig, quantize, tensors, ExportError, MODEL_FILE, QUANTIZED_MODEL_FILE},
    models::bert::text_classification::export::PORTABLE_MODEL_TYPE,
    pipelines::text_classification::{
        batcher::truncating, Predict, PredictError, CONFIG_FILE, TOKENIZER_FILE,
    },
    utils::classes::Labels,
};

/// An exported classifier loaded on the CPU
pub struct Predictor {
    bert: BertModel,
    pooler: Option<Linear>,
    classifier: Linear,
    tokenizer: Tokenizer,
    labels: Labels,
    device: Device,
}

impl Predictor {
    /// Load the f32 weights from an export directory
    pub fn load(export_dir: &Path) -> anyhow::Result<Self> {
        let device = Device::Cpu;
        let weights_path = export_dir.join(MODEL_FILE);

        Self::load_with(export_dir, || {
            log::info!("Loading weights from {}", weights_path.display());

            let vars = tensors::read_file(&weights_path, &device)?;

            Ok(VarBuilder::from_tensors(vars, DType::F32, &device))
        })
    }

    /// Load the Q8_0 weights from an export directory, dequantizing them to f32
    pub fn load_quantized(export_dir: &Path) -> anyhow::Result<Self> {
        let device = Device::Cpu;
        let weights_path = export_dir.join(QUANTIZED_MODEL_FILE);

        Self::load_with(export_dir, || {
            log::info!("Loading quantized weights from {}", weights_path.display());

            let vars = quantize::read_file(&weights_path, &device)?;

            Ok(VarBuilder::from_tensors(vars, DType::F32, &device))
        })
    }

    fn load_with(
        export_dir: &Path,
        weights: impl FnOnce() -> anyhow::Result<VarBuilder<'static>>,
    ) -> anyhow::Result<Self> {
        let device = Device::Cpu;

        let config = PortableConfig::load(&export_dir.join(CONFIG_FILE))?;
        if config.model_type != PORTABLE_MODEL_TYPE {
            return Err(ExportError::UnsupportedModelType(config.model_type).into());
        }

        let labels = config.labels()?;
        let bert_config: BertConfig = serde_json::from_value(serde_json::to_value(&config)?)?;

        let max_seq_len = config
            .max_seq_len
            .unwrap_or(config.max_position_embeddings);

        let tokenizer = Tokenizer::from_file(export_dir.join(TOKENIZER_FILE))
            .and_then(|tokenizer| truncating(tokenizer, max_seq_len))
            .map_err(|e| anyhow!("Unable to load tokenizer: {}", e))?;

        let vb = weights()?;
        let has_pooler = vb.contains_tensor("bert.pooler.dense.weight");

        let bert = BertModel::load(vb.pp("bert"), &bert_config)?;

        let pooler = if has_pooler {
            Some(candle_nn::linear(
                config.hidden_size,
                config.hidden_size,
                vb.pp("bert.pooler.dense"),
            )?)
        } else {
            None
        };

        let classifier = candle_nn::linear(config.hidden_size, labels.len(), vb.pp("classifier"))?;

        Ok(Self {
            bert,
            pooler,
            classifier,
            tokenizer,
            labels,
            device,
        })
    }
}

impl Predict for Predictor {
    fn scores(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Unable to encode {:?}: {}", text, e))?;

        let token_ids = encoding.get_ids();
        if token_ids.is_empty() {
            return Err(PredictError::NoTokens.into());
        }

        let input_ids = Tensor::new(token_ids, &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;

        // [1, seq_len, hidden_size] -> the [CLS] state: [1, hidden_size]
        let hidden_states = self.bert.forward(&input_ids, &token_type_ids)?;
        let cls = hidden_states.i((.., 0))?;

        let pooled = match &self.pooler {
            Some(pooler) => pooler.forward(&cls)?.tanh()?,
            None => cls,
        };

        let logits = self.classifier.forward(&pooled)?;
        let probabilities = candle_nn::ops::softmax(&logits, D::Minus1)?;

        Ok(probabilities.squeeze(0)?.to_vec1::<f32>()?)
    }

    fn labels(&self) -> &Labels {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_export_dir() {
        let dir = tempfile::tempdir().unwrap();

        let result = Predictor::load(&dir.path().join("missing"));

        assert!(matches!(
            result.map(|_| ()).unwrap_err().downcast_ref::<ExportError>(),
            Some(ExportError::Io { .. })
        ));
    }
}
