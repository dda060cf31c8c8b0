use std::path::{Path, PathBuf};

use burn::{
    config::Config as _,
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    module::{AutodiffModule, Module},
    optim::AdamWConfig,
    record::{CompactRecorder, Recorder},
    tensor::backend::{AutodiffBackend, Backend},
    train::{
        logger::FileMetricLogger,
        metric::{AccuracyMetric, CudaMetric, LearningRateMetric, LossMetric},
        ClassificationOutput, LearnerBuilder, ValidStep,
    },
    LearningRate,
};
use tokenizers::Tokenizer;

use crate::{
    datasets::{commands::Splits, Split},
    utils::{hugging_face::download_hf_model, renderer},
};

use super::{
    batcher::Train, evaluate, Batcher, EvalReport, Item, Model, ModelConfig, CONFIG_FILE,
    EVAL_RESULTS_FILE, MODEL_FILE, PIPELINE, TOKENIZER_FILE, TRAINING_CONFIG_FILE,
};

/// Define configuration struct for the experiment
#[derive(burn::config::Config)]
pub struct Config {
    /// Batch size
    #[config(default = 8)]
    pub batch_size: usize,

    /// Number of epochs
    #[config(default = 3)]
    pub num_epochs: usize,

    /// Maximum sequence length, longer inputs are truncated
    #[config(default = 32)]
    pub max_seq_len: usize,

    /// Adam epsilon
    #[config(default = 1e-8)]
    pub adam_epsilon: f32,

    /// Learning rate
    #[config(default = 5e-5)]
    pub learning_rate: LearningRate,

    /// Dropout rate
    #[config(default = 0.1)]
    pub hidden_dropout_prob: f64,

    /// Random seed for weight init and shuffling
    #[config(default = 42)]
    pub seed: u64,

    /// Model name (e.g., "bert-base-uncased")
    #[config(default = "\"bert-base-uncased\".to_string()")]
    pub model_name: String,

    /// Where checkpoints and the final model are written
    #[config(default = "\"intent_model\".to_string()")]
    pub output_dir: String,

    /// Where per-epoch metric logs are written
    #[config(default = "\"logs\".to_string()")]
    pub logging_dir: String,

    /// Render training progress with the terminal dashboard
    #[config(default = false)]
    pub use_tui: bool,
}

/// Fine-tune a pretrained model on both splits of a dataset and save it to `config.output_dir`
pub async fn train<B, M>(
    devices: Vec<B::Device>, // Devices on which to perform computation (e.g., CPU or CUDA device)
    splits: &Splits,         // Training and validation examples
    config: Config,          // Experiment configuration
) -> anyhow::Result<EvalReport>
where
    B: AutodiffBackend,
    M: Model<B> + 'static,
    i64: std::convert::From<<B as Backend>::IntElem>,
    M::InnerModule: ValidStep<
        Train<<B as AutodiffBackend>::InnerBackend>,
        ClassificationOutput<<B as AutodiffBackend>::InnerBackend>,
    >,
{
    let device = devices
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("At least one device is required for training"))?;

    let labels = splits.labels();
    if labels.is_empty() {
        return Err(anyhow!("The dataset does not contain any labeled examples"));
    }

    log::info!(
        "Training {} for {} with {} intent labels: {:?}",
        config.model_name,
        PIPELINE,
        labels.len(),
        labels.names()
    );

    let dataset_train = splits.encode(Split::Train, &labels)?;
    let dataset_valid = splits.encode(Split::Validation, &labels)?;

    let files = download_hf_model(&config.model_name).await?;

    let model_config = M::Config::load_pretrained(files.config, &labels, &config)
        .await
        .map_err(|e| anyhow!("Unable to load pre-trained model config file: {}", e))?;

    let model = M::load_from_safetensors(&device, files.weights, model_config.clone())?;

    // Initialize tokenizer
    let tokenizer = Tokenizer::from_file(&files.tokenizer)
        .map_err(|e| anyhow!("Unable to load tokenizer: {}", e))?;

    let model_trained = fine_tune::<B, M, _, _>(
        devices,
        model,
        &model_config,
        tokenizer.clone(),
        dataset_train,
        dataset_valid,
        &config,
    )?;

    let output_dir = PathBuf::from(&config.output_dir);

    // Measure accuracy over the full validation split
    let batcher_valid =
        Batcher::<B::InnerBackend>::new(tokenizer.clone(), &model_config.get_config(), device)
            .map_err(|e| anyhow!("Unable to configure tokenizer: {}", e))?;
    let report = evaluate(
        &model_trained.valid(),
        batcher_valid,
        splits.encode(Split::Validation, &labels)?,
        config.batch_size * 2,
    );

    log::info!("Validation {}", report);

    save::<B, M, _>(&output_dir, model_trained, &model_config, &tokenizer, &config)?;

    std::fs::write(
        output_dir.join(EVAL_RESULTS_FILE),
        serde_json::to_string_pretty(&report)?,
    )?;

    Ok(report)
}

/// Run the training loop over already-encoded datasets and return the fine-tuned model
pub fn fine_tune<B, M, I, D>(
    devices: Vec<B::Device>,
    model: M,
    model_config: &M::Config,
    tokenizer: Tokenizer,
    dataset_train: D,
    dataset_valid: D,
    config: &Config,
) -> anyhow::Result<M>
where
    B: AutodiffBackend,
    M: Model<B> + 'static,
    I: Item + 'static,
    D: Dataset<I> + 'static,
    i64: std::convert::From<<B as Backend>::IntElem>,
    M::InnerModule: ValidStep<
        Train<<B as AutodiffBackend>::InnerBackend>,
        ClassificationOutput<<B as AutodiffBackend>::InnerBackend>,
    >,
{
    let device = devices
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("At least one device is required for training"))?;

    B::seed(config.seed);

    std::fs::create_dir_all(&config.output_dir)?;
    std::fs::create_dir_all(&config.logging_dir)?;

    // Initialize batchers for training and validation data
    let pipeline_config = model_config.get_config();
    let batcher_train = Batcher::<B>::new(tokenizer.clone(), &pipeline_config, device.clone())
        .map_err(|e| anyhow!("Unable to configure tokenizer: {}", e))?;
    let batcher_valid = Batcher::<B::InnerBackend>::new(tokenizer, &pipeline_config, device)
        .map_err(|e| anyhow!("Unable to configure tokenizer: {}", e))?;

    let workers = std::thread::available_parallelism()?;

    // Initialize data loaders for training and validation data
    let dataloader_train = DataLoaderBuilder::new(batcher_train)
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(workers.into())
        .build(dataset_train);

    let dataloader_valid = DataLoaderBuilder::new(batcher_valid)
        .batch_size(config.batch_size * 2)
        .num_workers(workers.into())
        .build(dataset_valid);

    // Initialize optimizer
    let optimizer = AdamWConfig::new().with_epsilon(config.adam_epsilon).init();

    // Initialize learner
    let mut builder = LearnerBuilder::new(&config.output_dir)
        .metric_train(CudaMetric::new())
        .metric_valid(CudaMetric::new())
        .metric_train_numeric(AccuracyMetric::new())
        .metric_valid_numeric(AccuracyMetric::new())
        .metric_train_numeric(LossMetric::new())
        .metric_valid_numeric(LossMetric::new())
        .metric_train_numeric(LearningRateMetric::new())
        .metric_loggers(
            FileMetricLogger::new(&format!("{}/train", config.logging_dir)),
            FileMetricLogger::new(&format!("{}/valid", config.logging_dir)),
        )
        .with_file_checkpointer(CompactRecorder::new())
        .devices(devices)
        .num_epochs(config.num_epochs)
        .summary();

    if !config.use_tui {
        builder = builder.renderer(renderer::Simple::new());
    }

    let learner = builder.build(model, optimizer, config.learning_rate);

    // Train the model
    Ok(learner.fit(dataloader_train, dataloader_valid))
}

/// Save the model record, its configuration, the tokenizer and the training configuration
pub fn save<B, M, C>(
    output_dir: &Path,
    model: M,
    model_config: &C,
    tokenizer: &Tokenizer,
    config: &Config,
) -> anyhow::Result<()>
where
    B: Backend,
    M: Module<B>,
    C: burn::config::Config,
{
    std::fs::create_dir_all(output_dir)?;

    model_config
        .save(output_dir.join(CONFIG_FILE))
        .map_err(|e| anyhow!("Unable to save model config: {}", e))?;

    config
        .save(output_dir.join(TRAINING_CONFIG_FILE))
        .map_err(|e| anyhow!("Unable to save training config: {}", e))?;

    tokenizer
        .save(output_dir.join(TOKENIZER_FILE), false)
        .map_err(|e| anyhow!("Unable to save tokenizer: {}", e))?;

    CompactRecorder::new()
        .record(model.into_record(), output_dir.join(MODEL_FILE))
        .map_err(|e| anyhow!("Unable to save trained model weights: {}", e))?;

    log::info!("Model saved to {}", output_dir.display());

    Ok(())
}
