//! Adapt Bert for Sequence Classification to the Text Classification pipeline

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use bert_burn::model::BertModelConfig;
use burn::{config::Config as _, nn::LinearConfig, tensor::backend::Backend};

use crate::{
    pipelines::text_classification::{self, training, CONFIG_FILE},
    utils::classes::{ClassesError, Labels},
};

use super::Model;

/// The Model Configuration
#[derive(burn::config::Config)]
pub struct Config {
    // -- Fields copied from BertModelConfig because #[serde(flatten)] is not supported yet
    /// Number of attention heads in the multi-head attention
    pub num_attention_heads: usize,
    /// Number of transformer encoder layers/blocks
    pub num_hidden_layers: usize,
    /// Layer normalization epsilon
    pub layer_norm_eps: f64,
    /// Size of bert embedding (e.g., 768 for roberta-base)
    pub hidden_size: usize,
    /// Size of the intermediate position wise feedforward layer
    pub intermediate_size: usize,
    /// Size of the vocabulary
    pub vocab_size: usize,
    /// Max position embeddings, in RoBERTa equal to max_seq_len + 2 (514), for BERT equal to max_seq_len(512)
    pub max_position_embeddings: usize,
    /// Identifier for sentence type in input (e.g., 0 for single sentence, 1 for pair)
    pub type_vocab_size: usize,
    /// Dropout value across layers, typically 0.1
    pub hidden_dropout_prob: f64,
    /// BERT model name (roberta)
    pub model_type: String,
    /// Index of the padding token
    pub pad_token_id: usize,
    /// Maximum sequence length for the tokenizer
    pub max_seq_len: Option<usize>,
    /// Whether to add a pooling layer to the model
    pub with_pooling_layer: Option<bool>,
    // -- End fields copied from BertModelConfig
    /// A map from class ids to class name labels
    pub id2label: BTreeMap<usize, String>,
    /// A map from class name labels to class ids
    pub label2id: BTreeMap<String, usize>,
}

impl Config {
    /// Build the classifier configuration from a base model config and a label vocabulary
    pub fn new_with_labels(model: BertModelConfig, labels: &Labels) -> Self {
        Config::new(
            model.num_attention_heads,
            model.num_hidden_layers,
            model.layer_norm_eps,
            model.hidden_size,
            model.intermediate_size,
            model.vocab_size,
            model.max_position_embeddings,
            model.type_vocab_size,
            model.hidden_dropout_prob,
            model.model_type,
            model.pad_token_id,
            labels.id2label().clone(),
            labels.label2id().clone(),
        )
        .with_max_seq_len(model.max_seq_len)
        .with_with_pooling_layer(model.with_pooling_layer)
    }

    /// Load a trained classifier configuration from an artifact directory, as it was saved
    pub fn load_from_dir(artifact_dir: &Path) -> anyhow::Result<Self> {
        Config::load(artifact_dir.join(CONFIG_FILE))
            .map_err(|e| anyhow!("Unable to load config file: {}", e))
    }

    /// Load a trained classifier configuration from an artifact directory, with dropout disabled
    pub fn load_for_inference(artifact_dir: &Path) -> anyhow::Result<Self> {
        let mut config = Self::load_from_dir(artifact_dir)?;

        config.hidden_dropout_prob = 0.0;

        Ok(config)
    }

    /// Get the Bert model configuration
    pub fn get_bert_config(&self) -> BertModelConfig {
        BertModelConfig::new(
            self.num_attention_heads,
            self.num_hidden_layers,
            self.layer_norm_eps,
            self.hidden_size,
            self.intermediate_size,
            self.vocab_size,
            self.max_position_embeddings,
            self.type_vocab_size,
            self.hidden_dropout_prob,
            self.model_type.clone(),
            self.pad_token_id,
        )
        .with_max_seq_len(self.max_seq_len)
        .with_with_pooling_layer(self.with_pooling_layer)
    }

    /// The label vocabulary stored with the model
    pub fn labels(&self) -> Result<Labels, ClassesError> {
        Labels::from_id2label(self.id2label.clone())
    }

    /// Initialize the model
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        let model = self.get_bert_config().init(device);

        let n_classes = self.id2label.len();

        let output = LinearConfig::new(self.hidden_size, n_classes).init(device);

        Model {
            model,
            output,
            n_classes,
        }
    }
}

impl text_classification::ModelConfig for Config {
    /// Load a pretrained model configuration
    async fn load_pretrained(
        config_file: PathBuf,
        labels: &Labels,
        training: &training::Config,
    ) -> anyhow::Result<Self> {
        let mut bert_config = BertModelConfig::load(config_file)
            .map_err(|e| anyhow!("Unable to load Hugging Face Config file: {}", e))?;

        // Enable the pooling layer for sequence classification
        bert_config.with_pooling_layer = Some(true);
        bert_config.max_seq_len = Some(training.max_seq_len);
        bert_config.hidden_dropout_prob = training.hidden_dropout_prob;

        let model_config = Config::new_with_labels(bert_config, labels);

        if model_config.id2label.is_empty() {
            return Err(anyhow::anyhow!(
                "Classes are not defined in the model configuration"
            ));
        }

        Ok(model_config)
    }

    fn get_config(&self) -> text_classification::Config {
        text_classification::Config {
            pad_token_id: self.pad_token_id,
            max_position_embeddings: self.max_position_embeddings,
            max_seq_len: self.max_seq_len,
        }
    }
}
