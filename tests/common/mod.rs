#![allow(dead_code)]

use std::{path::Path, str::FromStr};

use burn::{
    backend::{ndarray::NdArrayDevice, NdArray},
    module::Param,
    tensor::Tensor,
};
use burn_intents::{
    datasets::commands::{Item, Splits},
    models::bert::text_classification::{Config, Model},
    pipelines::text_classification::training,
    utils::classes::Labels,
};
use tokenizers::Tokenizer;

pub const TOKENIZER: &str = r#"{
    "version": "1.0",
    "truncation": null,
    "padding": null,
    "added_tokens": [],
    "normalizer": { "type": "Lowercase" },
    "pre_tokenizer": { "type": "WhitespaceSplit" },
    "post_processor": {
        "type": "BertProcessing",
        "sep": ["[SEP]", 17],
        "cls": ["[CLS]", 16]
    },
    "decoder": null,
    "model": {
        "type": "WordLevel",
        "vocab": {
            "[PAD]": 0,
            "[UNK]": 1,
            "brighten": 2,
            "image": 3,
            "by": 4,
            "20%": 5,
            "draw": 6,
            "a": 7,
            "red": 8,
            "circle": 9,
            "crop": 10,
            "the": 11,
            "photo": 12,
            "to": 13,
            "square": 14,
            "make": 15,
            "[CLS]": 16,
            "[SEP]": 17
        },
        "unk_token": "[UNK]"
    }
}"#;

pub fn tokenizer() -> Tokenizer {
    Tokenizer::from_str(TOKENIZER).unwrap()
}

pub fn splits() -> Splits {
    Splits::new(
        vec![
            Item::new("brighten image by 20%".to_string(), "adjust_brightness".to_string()),
            Item::new("draw a red circle".to_string(), "draw_shape".to_string()),
            Item::new("crop the photo".to_string(), "crop_image".to_string()),
            Item::new("make the image brighten".to_string(), "adjust_brightness".to_string()),
        ],
        vec![
            Item::new("draw a square".to_string(), "draw_shape".to_string()),
            Item::new("crop the image to a square".to_string(), "crop_image".to_string()),
        ],
    )
}

/// A two-layer BERT small enough to run on the CPU in tests
pub fn tiny_config(labels: &Labels) -> Config {
    Config::new(
        2,
        2,
        1e-12,
        32,
        64,
        32,
        512,
        2,
        0.1,
        "bert".to_string(),
        0,
        labels.id2label().clone(),
        labels.label2id().clone(),
    )
    .with_max_seq_len(Some(16))
    .with_with_pooling_layer(Some(true))
}

/// Write a randomly initialized model in the trainer's artifact layout
pub fn write_native_model(dir: &Path, labels: &Labels) -> Config {
    let config = tiny_config(labels);
    let model = config.init::<NdArray>(&NdArrayDevice::Cpu);

    save_model(dir, model, config)
}

/// Write a randomly initialized model whose classifier bias leans towards one class
pub fn write_biased_model(dir: &Path, labels: &Labels, class_id: usize) -> Config {
    let config = tiny_config(labels);
    let mut model: Model<NdArray> = config.init(&NdArrayDevice::Cpu);

    let bias: Vec<f32> = (0..labels.len())
        .map(|id| if id == class_id { 4.0 } else { 0.0 })
        .collect();
    model.output.bias = Some(Param::from(Tensor::from_floats(
        bias.as_slice(),
        &NdArrayDevice::Cpu,
    )));

    save_model(dir, model, config)
}

fn save_model(dir: &Path, model: Model<NdArray>, config: Config) -> Config {
    training::save::<NdArray, _, _>(
        dir,
        model,
        &config,
        &tokenizer(),
        &training::Config::new(),
    )
    .unwrap();

    config
}
