//! # Burn Intents
//!
//! Fine-tune BERT intent classifiers with Burn, export them to a portable Hugging Face layout,
//! and serve predictions from either format.
#![forbid(unsafe_code)]

/// Models
pub mod models;

/// Pipelines
pub mod pipelines;

/// Datasets
pub mod datasets;

/// Utilities
pub mod utils;

/// Portable export and quantization
pub mod export;

/// Inference on exported models
pub mod portable;

/// Error macros
#[macro_use]
extern crate anyhow;
