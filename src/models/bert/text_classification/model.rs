use std::path::{Path, PathBuf};

use bert_burn::{
    data::BertInferenceBatch,
    model::{BertModel, BertModelOutput},
};
use burn::{
    module::{ConstantRecord, Module},
    nn::{loss::CrossEntropyLossConfig, Linear, LinearConfig, LinearRecord},
    record::{CompactRecorder, Recorder},
    tensor::{
        activation::softmax,
        backend::{AutodiffBackend, Backend},
        Int, Tensor,
    },
    train::ClassificationOutput,
};
use derive_new::new;

use crate::pipelines::text_classification::{self, batcher::Infer, MODEL_FILE};

use super::Config;

/// BERT for text Classification
#[derive(Module, Debug, new)]
pub struct Model<B: Backend> {
    /// The base BERT model
    pub model: BertModel<B>,

    /// Linear layer for text classification
    pub output: Linear<B>,

    /// Total number of classes
    pub n_classes: usize,
}

/// Define model behavior
impl<B: Backend> Model<B> {
    /// Defines forward pass for training
    pub fn forward(
        &self,
        input: BertInferenceBatch<B>,
        targets: Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B> {
        let output = self.logits(input);

        let targets = targets.to_device(&output.device());

        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), targets.clone());

        ClassificationOutput {
            loss,
            output,
            targets,
        }
    }

    /// Defines forward pass for inference
    pub fn infer(&self, input: BertInferenceBatch<B>) -> Tensor<B, 2> {
        softmax(self.logits(input), 1)
    }

    /// Class logits for the first ([CLS]) token of each sequence: [batch_size, n_classes]
    fn logits(&self, input: BertInferenceBatch<B>) -> Tensor<B, 2> {
        let [batch_size, _seq_length] = input.tokens.dims();

        let BertModelOutput {
            pooled_output,
            hidden_states,
        } = self.model.forward(input);

        self.output
            .forward(pooled_output.unwrap_or(hidden_states))
            .slice([0..batch_size, 0..1])
            .reshape([batch_size, self.n_classes])
    }

    /// Load a trained model record from an artifact directory
    pub fn load(artifact_dir: &Path, config: &Config, device: &B::Device) -> anyhow::Result<Self> {
        let record: ModelRecord<B> = CompactRecorder::new()
            .load(artifact_dir.join(MODEL_FILE), device)
            .map_err(|e| anyhow!("Unable to load trained model weights: {}", e))?;

        Ok(config.init(device).load_record(record))
    }
}

impl<B: AutodiffBackend> text_classification::Model<B> for Model<B>
where
    i64: std::convert::From<<B as burn::tensor::backend::Backend>::IntElem>,
{
    /// The model configuration
    type Config = Config;

    /// Load a model from a file
    fn load_from_safetensors(
        device: &B::Device,
        model_file: PathBuf,
        config: Self::Config,
    ) -> anyhow::Result<Self> {
        let n_classes = config.id2label.len();
        if n_classes == 0 {
            return Err(anyhow::anyhow!(
                "Classes are not defined in the model configuration"
            ));
        }

        // Initialize the linear output
        let output = LinearConfig::new(config.hidden_size, n_classes).init(device);

        let model = config.init(device).load_record(ModelRecord {
            model: BertModel::from_safetensors(model_file, device, config.get_bert_config()),
            output: LinearRecord {
                weight: output.weight,
                bias: output.bias,
            },
            n_classes: ConstantRecord::new(),
        });

        Ok(model)
    }
}

impl<B: Backend> From<Infer<B>> for BertInferenceBatch<B> {
    fn from(input: Infer<B>) -> Self {
        BertInferenceBatch {
            tokens: input.tokens,
            mask_pad: input.mask_pad,
        }
    }
}
