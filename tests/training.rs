mod common;

use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    module::AutodiffModule,
};
use burn_intents::{
    datasets::{
        commands::{Item, Splits},
        Split,
    },
    models::bert::text_classification::{Model, Predictor},
    pipelines::text_classification::{
        evaluate, fine_tune, training, Batcher, ModelConfig as _, Predict,
    },
};
use pretty_assertions::assert_eq;

type B = Autodiff<NdArray>;

#[test]
fn test_single_intent_dataset_trains() {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("intent_model");

    let splits = Splits::new(
        vec![
            Item::new("crop the photo".to_string(), "crop_image".to_string()),
            Item::new("crop the image".to_string(), "crop_image".to_string()),
            Item::new("crop to a square".to_string(), "crop_image".to_string()),
        ],
        vec![Item::new("crop a photo".to_string(), "crop_image".to_string())],
    );

    let labels = splits.labels();
    assert_eq!(labels.len(), 1);

    let model_config = common::tiny_config(&labels);
    let model: Model<B> = model_config.init(&NdArrayDevice::Cpu);

    let config = training::Config::new()
        .with_num_epochs(1)
        .with_batch_size(2)
        .with_output_dir(output_dir.to_string_lossy().to_string())
        .with_logging_dir(dir.path().join("logs").to_string_lossy().to_string());

    let trained = fine_tune::<B, Model<B>, _, _>(
        vec![NdArrayDevice::Cpu],
        model,
        &model_config,
        common::tokenizer(),
        splits.encode(Split::Train, &labels).unwrap(),
        splits.encode(Split::Validation, &labels).unwrap(),
        &config,
    )
    .unwrap();

    let batcher = Batcher::<NdArray>::new(
        common::tokenizer(),
        &model_config.get_config(),
        NdArrayDevice::Cpu,
    )
    .unwrap();
    let report = evaluate(
        &trained.valid(),
        batcher,
        splits.encode(Split::Validation, &labels).unwrap(),
        config.batch_size,
    );

    assert_eq!(report.total, 1);
    assert_eq!(report.correct, 1);

    training::save::<B, _, _>(
        &output_dir,
        trained,
        &model_config,
        &common::tokenizer(),
        &config,
    )
    .unwrap();

    for file in [
        "config.json",
        "model.mpk",
        "tokenizer.json",
        "training_config.json",
    ] {
        assert!(output_dir.join(file).is_file(), "missing {file}");
    }

    let predictor = Predictor::<NdArray>::load(&output_dir, NdArrayDevice::Cpu).unwrap();
    assert_eq!(predictor.predict_label("crop this").unwrap(), "crop_image");
}
