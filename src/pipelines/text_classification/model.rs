use std::{fmt::Display, path::PathBuf};

use burn::{
    module::AutodiffModule,
    tensor::backend::AutodiffBackend,
    train::{ClassificationOutput, TrainStep},
};

use crate::utils::classes::Labels;

use super::{batcher::Train, training};

/// What the batcher needs to know about a model's input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The padding token ID
    pub pad_token_id: usize,

    /// The max position embeddings
    pub max_position_embeddings: usize,

    /// An optional max sequence length, if different from max position embeddings
    pub max_seq_len: Option<usize>,
}

impl Config {
    /// Inputs are truncated to this many tokens
    pub fn max_seq_length(&self) -> usize {
        self.max_seq_len.unwrap_or(self.max_position_embeddings)
    }
}

/// A classifier that can be fine-tuned by the text classification pipeline
pub trait Model<B>:
    AutodiffModule<B> + TrainStep<Train<B>, ClassificationOutput<B>> + Display
where
    B: AutodiffBackend,
    i64: std::convert::From<<B as burn::tensor::backend::Backend>::IntElem>,
{
    /// The model configuration
    type Config: ModelConfig;

    /// Load pretrained base weights from a file and attach a fresh classification head
    fn load_from_safetensors(
        device: &B::Device,
        model_file: PathBuf,
        config: Self::Config,
    ) -> anyhow::Result<Self>;
}

/// A trait for configs that can be used for Text Classification models
pub trait ModelConfig: burn::config::Config + Clone {
    /// Load a pretrained model configuration, sized for the given label vocabulary
    fn load_pretrained(
        config_file: PathBuf,
        labels: &Labels,
        training: &training::Config,
    ) -> impl std::future::Future<Output = anyhow::Result<Self>> + Send;

    /// The input settings shared with the batcher
    fn get_config(&self) -> Config;
}
