use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::utils::classes::{ClassesError, Labels};

use super::ExportError;

/// A Hugging Face `BertConfig` for sequence classification, as written next to exported weights
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortableConfig {
    /// Model classes able to load these weights
    pub architectures: Vec<String>,
    /// Base model type
    pub model_type: String,
    /// Size of the vocabulary
    pub vocab_size: usize,
    /// Size of the hidden states
    pub hidden_size: usize,
    /// Number of encoder layers
    pub num_hidden_layers: usize,
    /// Number of attention heads per layer
    pub num_attention_heads: usize,
    /// Size of the feed-forward layer
    pub intermediate_size: usize,
    /// Feed-forward activation
    pub hidden_act: String,
    /// Dropout applied to hidden states
    pub hidden_dropout_prob: f64,
    /// Dropout applied to attention probabilities
    pub attention_probs_dropout_prob: f64,
    /// Number of position embeddings
    pub max_position_embeddings: usize,
    /// Number of token type embeddings
    pub type_vocab_size: usize,
    /// Standard deviation used at initialization
    pub initializer_range: f64,
    /// Layer normalization epsilon
    pub layer_norm_eps: f64,
    /// Index of the padding token
    pub pad_token_id: usize,
    /// Kind of position embedding
    pub position_embedding_type: String,
    /// Whether a key/value cache may be used
    pub use_cache: bool,
    /// Dropout before the classifier, if different from the hidden dropout
    pub classifier_dropout: Option<f64>,
    /// Maximum number of tokens per input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_seq_len: Option<usize>,
    /// A map from class ids to class name labels
    pub id2label: BTreeMap<usize, String>,
    /// A map from class name labels to class ids
    pub label2id: BTreeMap<String, usize>,
}

impl PortableConfig {
    /// Read a config from a `config.json` file
    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let contents = fs::read_to_string(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ExportError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the config as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        let contents = serde_json::to_string_pretty(self).map_err(|source| ExportError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        fs::write(path, contents).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The label vocabulary carried by the config
    pub fn labels(&self) -> Result<Labels, ClassesError> {
        Labels::from_id2label(self.id2label.clone())
    }
}
