use std::fmt::Debug;

use burn::{
    data::dataloader,
    nn::attention::generate_padding_mask,
    tensor::{backend::Backend, Bool, Data, ElementConversion, Int, Shape, Tensor},
};
use derive_new::new;
use tokenizers::{Tokenizer, TruncationParams};

use super::{Config, Item};

/// An inference batch for text classification
#[derive(Debug, Clone, new)]
pub struct Infer<B: Backend> {
    /// Tokenized text as 2D tensor: [batch_size, max_seq_length]
    pub tokens: Tensor<B, 2, Int>,

    /// Padding mask for the tokenized text containing booleans for padding locations
    pub mask_pad: Tensor<B, 2, Bool>,
}

/// A training batch for text classification
#[derive(Clone, Debug, new)]
pub struct Train<B: Backend> {
    /// Bert Model input
    pub input: Infer<B>,

    /// Class ids for the batch
    pub targets: Tensor<B, 1, Int>,
}

/// Struct for batching text classification items
#[derive(Clone)]
pub struct Batcher<B: Backend> {
    /// Tokenizer for converting text to token IDs
    tokenizer: Tokenizer,

    /// Maximum sequence length for tokenized text
    max_seq_length: usize,

    /// ID of the padding token
    pad_token_id: usize,

    /// Device on which to perform computation (e.g., CPU or CUDA device)
    device: B::Device,
}

/// Make a tokenizer truncate its encodings to `max_length` tokens, special tokens included
pub fn truncating(mut tokenizer: Tokenizer, max_length: usize) -> tokenizers::Result<Tokenizer> {
    tokenizer.with_truncation(Some(TruncationParams {
        max_length,
        ..Default::default()
    }))?;

    Ok(tokenizer)
}

impl<B: Backend> Batcher<B> {
    /// Creates a new batcher
    pub fn new(tokenizer: Tokenizer, config: &Config, device: B::Device) -> tokenizers::Result<Self> {
        let max_seq_length = config.max_seq_length();

        Ok(Self {
            tokenizer: truncating(tokenizer, max_seq_length)?,
            pad_token_id: config.pad_token_id,
            max_seq_length,
            device,
        })
    }

    /// Tokenize a single text into token ids
    pub fn encode(&self, text: &str) -> tokenizers::Result<Vec<usize>> {
        let encoding = self.tokenizer.encode(text, true)?;

        Ok(encoding.get_ids().iter().map(|t| *t as usize).collect())
    }

    /// Pad to the longest sequence in the batch
    pub fn pad(&self, token_ids_list: Vec<Vec<usize>>) -> Infer<B> {
        let padding = generate_padding_mask(
            self.pad_token_id,
            token_ids_list,
            Some(self.max_seq_length),
            &self.device,
        );

        Infer {
            tokens: padding.tensor,
            mask_pad: padding.mask,
        }
    }
}

/// Implement Batcher trait for Batcher struct for inference
impl<B: Backend> dataloader::batcher::Batcher<String, Infer<B>> for Batcher<B> {
    /// Collects a vector of texts into an inference batch
    fn batch(&self, items: Vec<String>) -> Infer<B> {
        let token_ids_list = items
            .iter()
            .map(|input| self.encode(input).expect("unable to encode"))
            .collect();

        self.pad(token_ids_list)
    }
}

/// Implement Batcher trait for Batcher struct for training
impl<B: Backend, I: Item> dataloader::batcher::Batcher<I, Train<B>> for Batcher<B> {
    /// Collects a vector of text classification items into a training batch
    fn batch(&self, items: Vec<I>) -> Train<B> {
        let batch_size = items.len();

        let inputs = items.iter().map(|item| item.input().to_string()).collect();
        let input: Infer<B> = self.batch(inputs);

        let class_ids: Vec<B::IntElem> = items
            .iter()
            .map(|item| (item.class_id() as i64).elem())
            .collect();

        let targets = Tensor::from_data(Data::new(class_ids, Shape::new([batch_size])), &self.device);

        Train { input, targets }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use burn::{
        backend::{ndarray::NdArrayDevice, NdArray},
        data::dataloader::batcher::Batcher as _,
    };
    use pretty_assertions::assert_eq;

    use crate::datasets::commands::Encoded;

    use super::*;

    const TOKENIZER: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": { "type": "Lowercase" },
        "pre_tokenizer": { "type": "WhitespaceSplit" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {
                "[PAD]": 0,
                "[UNK]": 1,
                "draw": 2,
                "a": 3,
                "red": 4,
                "circle": 5,
                "[CLS]": 6,
                "[SEP]": 7
            },
            "unk_token": "[UNK]"
        }
    }"#;

    fn batcher(max_seq_len: usize) -> Batcher<NdArray> {
        let tokenizer = Tokenizer::from_str(TOKENIZER).unwrap();
        let config = Config {
            pad_token_id: 0,
            max_position_embeddings: 512,
            max_seq_len: Some(max_seq_len),
        };

        Batcher::new(tokenizer, &config, NdArrayDevice::Cpu).unwrap()
    }

    #[test]
    fn test_encode() {
        let batcher = batcher(32);

        assert_eq!(batcher.encode("Draw a RED square").unwrap(), vec![2, 3, 4, 1]);
    }

    #[test]
    fn test_batch_pads_and_truncates() {
        let batcher = batcher(3);

        let batch: Infer<NdArray> = batcher.batch(vec![
            "draw a red circle".to_string(),
            "draw".to_string(),
        ]);

        assert_eq!(batch.tokens.dims(), [2, 3]);
        assert_eq!(
            batch.tokens.into_data().convert::<i64>().value,
            vec![2, 3, 4, 2, 0, 0]
        );
        assert_eq!(
            batch.mask_pad.into_data().value,
            vec![false, false, false, false, true, true]
        );
    }

    #[test]
    fn test_truncation_keeps_special_tokens() {
        let tokenizer = Tokenizer::from_str(&TOKENIZER.replace(
            r#""post_processor": null"#,
            r#""post_processor": {
                "type": "BertProcessing",
                "sep": ["[SEP]", 7],
                "cls": ["[CLS]", 6]
            }"#,
        ))
        .unwrap();
        let config = Config {
            pad_token_id: 0,
            max_position_embeddings: 512,
            max_seq_len: Some(4),
        };

        let batcher = Batcher::<NdArray>::new(tokenizer, &config, NdArrayDevice::Cpu).unwrap();

        assert_eq!(batcher.encode("draw a red circle").unwrap(), vec![6, 2, 3, 7]);
        assert_eq!(batcher.encode("").unwrap(), vec![6, 7]);
    }

    #[test]
    fn test_training_batch_targets() {
        let batcher = batcher(32);

        let batch: Train<NdArray> = batcher.batch(vec![
            Encoded::new("draw a circle".to_string(), 0),
            Encoded::new("something else".to_string(), 1),
        ]);

        assert_eq!(
            batch.targets.into_data().convert::<i64>().value,
            vec![0, 1]
        );
    }
}
