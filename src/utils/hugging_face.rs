use std::path::PathBuf;

use hf_hub::api::tokio::{Api, ApiRepo};

/// Local paths to the files of a pretrained Hugging Face model
#[derive(Clone, Debug)]
pub struct PretrainedFiles {
    /// The model's `config.json`
    pub config: PathBuf,

    /// The model's `model.safetensors` weights
    pub weights: PathBuf,

    /// The model's `tokenizer.json`
    pub tokenizer: PathBuf,
}

/// Download model config, weights and tokenizer from Hugging Face Hub
/// If file exists in cache, it will not be downloaded again
// NOTE: Modified from the built-in function to work within an already-async context
pub async fn download_hf_model(model_name: &str) -> anyhow::Result<PretrainedFiles> {
    let api = Api::new()?;
    let repo = api.model(model_name.to_string());

    Ok(PretrainedFiles {
        weights: fetch(&repo, model_name, "model.safetensors").await?,
        config: fetch(&repo, model_name, "config.json").await?,
        tokenizer: fetch(&repo, model_name, "tokenizer.json").await?,
    })
}

async fn fetch(repo: &ApiRepo, model_name: &str, file: &str) -> anyhow::Result<PathBuf> {
    log::info!("Fetching {file} for {model_name}");

    repo.get(file).await.map_err(|e| {
        anyhow!(
            "Failed to download: {} file with name: {} from HuggingFace Hub: {}",
            model_name,
            file,
            e
        )
    })
}
