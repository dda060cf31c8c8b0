use std::path::Path;

use burn::tensor::backend::Backend;
use tokenizers::Tokenizer;

use crate::{
    pipelines::text_classification::{
        Batcher, ModelConfig as _, Predict, PredictError, TOKENIZER_FILE,
    },
    utils::{classes::Labels, tensors::to_rows},
};

use super::{Config, Model};

/// A fine-tuned classifier loaded from a native artifact directory, ready for repeated predictions
pub struct Predictor<B: Backend> {
    model: Model<B>,
    batcher: Batcher<B>,
    labels: Labels,
}

impl<B: Backend> Predictor<B> {
    /// Load the configuration, tokenizer and weights saved by the trainer
    pub fn load(artifact_dir: &Path, device: B::Device) -> anyhow::Result<Self> {
        // Load experiment configuration
        let config = Config::load_for_inference(artifact_dir)?;
        let labels = config.labels()?;

        // Initialize tokenizer
        let tokenizer = Tokenizer::from_file(artifact_dir.join(TOKENIZER_FILE))
            .map_err(|e| anyhow!("Unable to load tokenizer: {}", e))?;

        // Load pre-trained model weights
        log::info!("Loading weights from {}", artifact_dir.display());

        let model = Model::load(artifact_dir, &config, &device)?;

        let batcher = Batcher::new(tokenizer, &config.get_config(), device)
            .map_err(|e| anyhow!("Unable to configure tokenizer: {}", e))?;

        Ok(Self {
            model,
            batcher,
            labels,
        })
    }
}

impl<B: Backend> Predict for Predictor<B> {
    fn scores(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let token_ids = self
            .batcher
            .encode(text)
            .map_err(|e| anyhow!("Unable to encode {:?}: {}", text, e))?;

        if token_ids.is_empty() {
            return Err(PredictError::NoTokens.into());
        }

        let input = self.batcher.pad(vec![token_ids]);

        let probabilities = self.model.infer(input.into());

        to_rows(probabilities)
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("The model returned an empty batch"))
    }

    fn labels(&self) -> &Labels {
        &self.labels
    }
}
