//! Export a trained classifier to a portable Hugging Face layout

use std::{
    fs,
    path::{Path, PathBuf},
};

use burn::tensor::backend::Backend;
use derive_new::new;

use crate::{
    models::bert::text_classification::{Config, Model},
    pipelines::text_classification::{Predict, Prediction, CONFIG_FILE, TOKENIZER_FILE},
    portable,
    utils::files::copy_existing,
};

/// Hugging Face config for the exported weights
pub mod config;

/// Int8 quantization
pub mod quantize;

/// Safetensors reading and writing
pub mod tensors;

use quantize::QuantizeError;

/// Default directory for trained models
pub static DEFAULT_MODEL_DIR: &str = "intent_model";

/// Default directory for exported models
pub static DEFAULT_EXPORT_DIR: &str = "onnx_model";

/// Exported f32 weights within a portable directory
pub static MODEL_FILE: &str = "model.safetensors";

/// Exported Q8_0 weights within a portable directory
pub static QUANTIZED_MODEL_FILE: &str = "model.q8_0.gguf";

/// Text used to verify an export
pub static SMOKE_TEST_TEXT: &str = "brighten image by 20%";

/// Tokenizer files copied into the portable directory when present
pub static TOKENIZER_FILES: [&str; 4] = [
    "tokenizer.json",
    "tokenizer_config.json",
    "special_tokens_map.json",
    "vocab.txt",
];

/// What to export, and where
#[derive(Clone, Debug, new)]
pub struct ExportOptions {
    /// Directory written by the trainer
    pub model_dir: PathBuf,

    /// Directory to write the portable model into
    pub output_dir: PathBuf,

    /// Also write Q8_0 weights
    pub quantize: bool,

    /// Load the exported model and run a prediction
    pub smoke_test: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new(
            PathBuf::from(DEFAULT_MODEL_DIR),
            PathBuf::from(DEFAULT_EXPORT_DIR),
            true,
            false,
        )
    }
}

/// The files an export produced
#[derive(Clone, Debug)]
pub struct ExportReport {
    /// The f32 weights
    pub model_file: PathBuf,

    /// The Q8_0 weights, if written
    pub quantized_file: Option<PathBuf>,

    /// The smoke test result, if run
    pub smoke_test: Option<Prediction>,
}

/// Export the native model in `options.model_dir` to `options.output_dir`
pub fn export<B: Backend>(options: &ExportOptions, device: B::Device) -> anyhow::Result<ExportReport> {
    if !options.model_dir.is_dir() {
        return Err(ExportError::MissingModelDir(options.model_dir.clone()).into());
    }

    fs::create_dir_all(&options.output_dir).map_err(|source| ExportError::Io {
        path: options.output_dir.clone(),
        source,
    })?;

    // The exported config keeps the trained dropout, inference runs without it
    let portable_config = Config::load_from_dir(&options.model_dir)?.to_portable()?;
    let config = Config::load_for_inference(&options.model_dir)?;

    log::info!("Loading weights from {}", options.model_dir.display());

    let model = Model::<B>::load(&options.model_dir, &config, &device)?;
    let tensors = model.into_named_tensors();

    let model_file = options.output_dir.join(MODEL_FILE);
    tensors::write_file(&model_file, &tensors)?;

    log::info!(
        "Wrote {} tensors to {}",
        tensors.len(),
        model_file.display()
    );

    portable_config.save(&options.output_dir.join(CONFIG_FILE))?;
    copy_tokenizer(&options.model_dir, &options.output_dir)?;

    let quantized_file = if options.quantize {
        match quantize::quantize_file(&tensors, &portable_config.model_type, &options.output_dir) {
            Ok(path) => Some(path),
            Err(QuantizeError::Unavailable) => {
                log::warn!("Quantization is not available in this build, skipping Q8_0 export");
                None
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        None
    };

    let smoke_test = if options.smoke_test {
        let predictor = portable::Predictor::load(&options.output_dir)?;
        let prediction = predictor.predict(SMOKE_TEST_TEXT)?;

        log::info!(
            "Smoke test: {:?} -> {} ({})",
            SMOKE_TEST_TEXT,
            prediction.index,
            prediction.label
        );

        Some(prediction)
    } else {
        None
    };

    Ok(ExportReport {
        model_file,
        quantized_file,
        smoke_test,
    })
}

fn copy_tokenizer(model_dir: &Path, output_dir: &Path) -> Result<(), ExportError> {
    let copied =
        copy_existing(model_dir, output_dir, &TOKENIZER_FILES).map_err(|source| ExportError::Io {
            path: output_dir.to_path_buf(),
            source,
        })?;

    if !copied.iter().any(|path| path.ends_with(TOKENIZER_FILE)) {
        return Err(ExportError::MissingTokenizer(model_dir.to_path_buf()));
    }

    Ok(())
}

/// Export Error
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    /// The trained model directory does not exist
    #[error("model directory {} does not exist", .0.display())]
    MissingModelDir(PathBuf),

    /// The trained model directory has no tokenizer
    #[error("no tokenizer.json found in {}", .0.display())]
    MissingTokenizer(PathBuf),

    /// The base model cannot be run by the portable runtime
    #[error("model type {0:?} cannot be exported, only \"bert\" is supported")]
    UnsupportedModelType(String),

    /// A file could not be read or written
    #[error("unable to access {}: {source}", path.display())]
    Io {
        /// The file that failed
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// A config file could not be encoded or decoded
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        /// The file that failed
        path: PathBuf,
        /// The underlying serialization error
        source: serde_json::Error,
    },

    /// A weights file could not be encoded or decoded
    #[error("invalid safetensors data in {}: {source}", path.display())]
    Candle {
        /// The file that failed
        path: PathBuf,
        /// The underlying Candle error
        source: candle_core::Error,
    },
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_options() {
        let options = ExportOptions::default();

        assert_eq!(options.model_dir, PathBuf::from("intent_model"));
        assert_eq!(options.output_dir, PathBuf::from("onnx_model"));
        assert!(options.quantize);
        assert!(!options.smoke_test);
    }

    #[test]
    fn test_missing_tokenizer() {
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("intent_model");
        fs::create_dir_all(&model_dir).unwrap();

        assert!(matches!(
            copy_tokenizer(&model_dir, dir.path()),
            Err(ExportError::MissingTokenizer(_))
        ));
    }
}
