/// Common model config and traits for text classification
pub mod model;

/// Batcher
pub mod batcher;

/// Text Classification Items
pub mod item;

/// Training
pub mod training;

/// Accuracy evaluation
pub mod evaluation;

/// Predictions and the reusable predictor interface
pub mod prediction;

pub use batcher::Batcher;
pub use evaluation::{evaluate, EvalReport};
pub use item::Item;
pub use model::{Config, Model, ModelConfig};
pub use prediction::{Predict, PredictError, Prediction};
pub use training::{fine_tune, train};

/// The unique string token that identifies this pipeline
pub static PIPELINE: &str = "text-classification";

/// Model configuration file within an artifact directory
pub static CONFIG_FILE: &str = "config.json";

/// Model record file within an artifact directory (the recorder adds the extension)
pub static MODEL_FILE: &str = "model";

/// Tokenizer file within an artifact directory
pub static TOKENIZER_FILE: &str = "tokenizer.json";

/// Training hyper-parameters file within an artifact directory
pub static TRAINING_CONFIG_FILE: &str = "training_config.json";

/// Validation accuracy report within an artifact directory
pub static EVAL_RESULTS_FILE: &str = "eval_results.json";
