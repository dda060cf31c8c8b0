//! Flatten a trained classifier into Hugging Face `BertForSequenceClassification` tensors

use burn::{
    module::Module,
    nn::{EmbeddingRecord, LayerNormRecord, LinearRecord},
    tensor::backend::Backend,
};

use crate::export::{config::PortableConfig, tensors::NamedTensor, ExportError};

use super::{Config, Model};

/// The only base model type the portable runtime can execute
pub static PORTABLE_MODEL_TYPE: &str = "bert";

impl<B: Backend> Model<B> {
    /// Consume the model and return every weight under its Hugging Face name
    ///
    /// Burn stores linear weights as `[d_input, d_output]`, so they are transposed to the
    /// `[d_output, d_input]` layout other runtimes expect.
    pub fn into_named_tensors(self) -> Vec<NamedTensor> {
        let record = self.into_record();
        let bert = record.model;
        let mut tensors = Vec::new();

        let embeddings = bert.embeddings;
        push_embedding(
            &mut tensors,
            "bert.embeddings.word_embeddings",
            embeddings.word_embeddings,
        );
        push_embedding(
            &mut tensors,
            "bert.embeddings.position_embeddings",
            embeddings.position_embeddings,
        );
        push_embedding(
            &mut tensors,
            "bert.embeddings.token_type_embeddings",
            embeddings.token_type_embeddings,
        );
        push_layer_norm(&mut tensors, "bert.embeddings.LayerNorm", embeddings.layer_norm);

        for (i, layer) in bert.encoder.layers.into_iter().enumerate() {
            let prefix = format!("bert.encoder.layer.{i}");

            push_linear(&mut tensors, &format!("{prefix}.attention.self.query"), layer.mha.query);
            push_linear(&mut tensors, &format!("{prefix}.attention.self.key"), layer.mha.key);
            push_linear(&mut tensors, &format!("{prefix}.attention.self.value"), layer.mha.value);
            push_linear(
                &mut tensors,
                &format!("{prefix}.attention.output.dense"),
                layer.mha.output,
            );

            // Post-norm encoder: norm_1 follows attention, norm_2 follows the feed-forward block
            push_layer_norm(
                &mut tensors,
                &format!("{prefix}.attention.output.LayerNorm"),
                layer.norm_1,
            );
            push_linear(
                &mut tensors,
                &format!("{prefix}.intermediate.dense"),
                layer.pwff.linear_inner,
            );
            push_linear(&mut tensors, &format!("{prefix}.output.dense"), layer.pwff.linear_outer);
            push_layer_norm(&mut tensors, &format!("{prefix}.output.LayerNorm"), layer.norm_2);
        }

        if let Some(pooler) = bert.pooler {
            push_linear(&mut tensors, "bert.pooler.dense", pooler.output);
        }

        push_linear(&mut tensors, "classifier", record.output);

        tensors
    }
}

impl Config {
    /// The Hugging Face `config.json` describing the exported weights
    pub fn to_portable(&self) -> Result<PortableConfig, ExportError> {
        if self.model_type != PORTABLE_MODEL_TYPE {
            return Err(ExportError::UnsupportedModelType(self.model_type.clone()));
        }

        Ok(PortableConfig {
            architectures: vec!["BertForSequenceClassification".to_string()],
            model_type: self.model_type.clone(),
            vocab_size: self.vocab_size,
            hidden_size: self.hidden_size,
            num_hidden_layers: self.num_hidden_layers,
            num_attention_heads: self.num_attention_heads,
            intermediate_size: self.intermediate_size,
            hidden_act: "gelu".to_string(),
            hidden_dropout_prob: self.hidden_dropout_prob,
            attention_probs_dropout_prob: self.hidden_dropout_prob,
            max_position_embeddings: self.max_position_embeddings,
            type_vocab_size: self.type_vocab_size,
            initializer_range: 0.02,
            layer_norm_eps: self.layer_norm_eps,
            pad_token_id: self.pad_token_id,
            position_embedding_type: "absolute".to_string(),
            use_cache: true,
            classifier_dropout: None,
            max_seq_len: self.max_seq_len,
            id2label: self.id2label.clone(),
            label2id: self.label2id.clone(),
        })
    }
}

fn push_linear<B: Backend>(tensors: &mut Vec<NamedTensor>, prefix: &str, record: LinearRecord<B>) {
    tensors.push(NamedTensor::from_burn(
        format!("{prefix}.weight"),
        record.weight.val().transpose(),
    ));

    if let Some(bias) = record.bias {
        tensors.push(NamedTensor::from_burn(format!("{prefix}.bias"), bias.val()));
    }
}

fn push_layer_norm<B: Backend>(
    tensors: &mut Vec<NamedTensor>,
    prefix: &str,
    record: LayerNormRecord<B>,
) {
    tensors.push(NamedTensor::from_burn(
        format!("{prefix}.weight"),
        record.gamma.val(),
    ));
    tensors.push(NamedTensor::from_burn(format!("{prefix}.bias"), record.beta.val()));
}

fn push_embedding<B: Backend>(
    tensors: &mut Vec<NamedTensor>,
    prefix: &str,
    record: EmbeddingRecord<B>,
) {
    tensors.push(NamedTensor::from_burn(
        format!("{prefix}.weight"),
        record.weight.val(),
    ));
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use burn::backend::{ndarray::NdArrayDevice, NdArray};
    use pretty_assertions::assert_eq;

    use super::*;

    fn tiny_config() -> Config {
        Config::new(
            2,
            2,
            1e-12,
            8,
            16,
            12,
            512,
            2,
            0.0,
            "bert".to_string(),
            0,
            BTreeMap::from([(0, "crop_image".to_string()), (1, "draw_shape".to_string())]),
            BTreeMap::from([("crop_image".to_string(), 0), ("draw_shape".to_string(), 1)]),
        )
        .with_with_pooling_layer(Some(true))
    }

    #[test]
    fn test_named_tensors() {
        let model = tiny_config().init::<NdArray>(&NdArrayDevice::Cpu);

        let tensors = model.into_named_tensors();
        let shapes: BTreeMap<&str, &[usize]> = tensors
            .iter()
            .map(|t| (t.name.as_str(), t.shape.as_slice()))
            .collect();

        // 3 embeddings + LayerNorm (2), 16 per layer, pooler (2), classifier (2)
        assert_eq!(tensors.len(), 5 + 2 * 16 + 2 + 2);

        assert_eq!(shapes["bert.embeddings.word_embeddings.weight"], &[12, 8]);
        assert_eq!(shapes["bert.embeddings.position_embeddings.weight"], &[512, 8]);
        assert_eq!(shapes["bert.encoder.layer.1.intermediate.dense.weight"], &[16, 8]);
        assert_eq!(shapes["bert.encoder.layer.1.output.dense.weight"], &[8, 16]);
        assert_eq!(shapes["bert.encoder.layer.0.output.LayerNorm.bias"], &[8]);
        assert_eq!(shapes["bert.pooler.dense.weight"], &[8, 8]);
        assert_eq!(shapes["classifier.weight"], &[2, 8]);
        assert_eq!(shapes["classifier.bias"], &[2]);
    }

    #[test]
    fn test_portable_config_carries_labels() {
        let portable = tiny_config().to_portable().unwrap();

        assert_eq!(portable.id2label[&1], "draw_shape");
        assert_eq!(portable.label2id["crop_image"], 0);
        assert_eq!(portable.architectures, vec!["BertForSequenceClassification"]);
    }

    #[test]
    fn test_roberta_is_not_portable() {
        let mut config = tiny_config();
        config.model_type = "roberta".to_string();

        assert!(matches!(
            config.to_portable(),
            Err(ExportError::UnsupportedModelType(model_type)) if model_type == "roberta"
        ));
    }
}
