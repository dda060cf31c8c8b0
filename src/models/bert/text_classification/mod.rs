/// BERT for Text Classification Configuration
pub mod config;

/// BERT for Text Classification
pub mod model;

/// Training routine
pub mod train;

/// Prediction with a trained model
pub mod inference;

/// Conversion to Hugging Face tensor names
pub mod export;

pub use config::Config;
pub use inference::Predictor;
pub use model::{Model, ModelRecord};
