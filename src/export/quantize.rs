//! Int8 weight quantization with Candle's GGML block formats
//!
//! Matrices whose rows split into whole Q8_0 blocks are stored as Q8_0 (32 int8 values sharing
//! one f16 scale). Everything else stays f32.

use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use candle_core::{
    quantized::{gguf_file, GgmlDType, QTensor},
    Device, Tensor,
};

use super::tensors::NamedTensor;

/// GGUF metadata key naming the architecture of the weights
pub static ARCHITECTURE_KEY: &str = "general.architecture";

/// The block format used for quantized matrices
pub static QUANTIZED_DTYPE: GgmlDType = GgmlDType::Q8_0;

/// The storage format for a tensor of the given shape
pub fn dtype_for(shape: &[usize]) -> GgmlDType {
    match shape {
        [_, columns] if columns % QUANTIZED_DTYPE.block_size() == 0 => QUANTIZED_DTYPE,
        _ => GgmlDType::F32,
    }
}

/// Quantize a single tensor on the CPU
pub fn quantize_tensor(tensor: &NamedTensor) -> candle_core::Result<QTensor> {
    let values = tensor.to_candle(&Device::Cpu)?;

    QTensor::quantize(&values, dtype_for(&tensor.shape))
}

/// Write the quantized weights file into the output directory
#[cfg(feature = "quantize")]
pub fn quantize_file(
    tensors: &[NamedTensor],
    architecture: &str,
    output_dir: &Path,
) -> Result<PathBuf, QuantizeError> {
    use std::io::{BufWriter, Write};

    let path = output_dir.join(super::QUANTIZED_MODEL_FILE);
    let candle_error = |source| QuantizeError::Candle {
        path: path.clone(),
        source,
    };

    let mut sorted: Vec<&NamedTensor> = tensors.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut quantized = Vec::with_capacity(sorted.len());
    for tensor in sorted {
        quantized.push((tensor.name.as_str(), quantize_tensor(tensor).map_err(candle_error)?));
    }

    let blocks = quantized
        .iter()
        .filter(|(_, tensor)| tensor.dtype() == QUANTIZED_DTYPE)
        .count();

    let architecture = gguf_file::Value::String(architecture.to_string());
    let metadata = [(ARCHITECTURE_KEY, &architecture)];
    let entries: Vec<(&str, &QTensor)> = quantized.iter().map(|(name, t)| (*name, t)).collect();

    let io_error = |source| QuantizeError::Io {
        path: path.clone(),
        source,
    };

    let mut writer = BufWriter::new(File::create(&path).map_err(io_error)?);
    gguf_file::write(&mut writer, &metadata, &entries).map_err(candle_error)?;
    writer.flush().map_err(io_error)?;

    log::info!(
        "Wrote {} tensors ({} as {:?}) to {}",
        entries.len(),
        blocks,
        QUANTIZED_DTYPE,
        path.display()
    );

    Ok(path)
}

/// Quantization is compiled out of this build
#[cfg(not(feature = "quantize"))]
pub fn quantize_file(
    _tensors: &[NamedTensor],
    _architecture: &str,
    _output_dir: &Path,
) -> Result<PathBuf, QuantizeError> {
    Err(QuantizeError::Unavailable)
}

/// Read a quantized weights file, dequantizing every tensor to f32
pub fn read_file(path: &Path, device: &Device) -> Result<HashMap<String, Tensor>, QuantizeError> {
    let candle_error = |source| QuantizeError::Candle {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| QuantizeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let content = gguf_file::Content::read(&mut reader).map_err(candle_error)?;

    let mut tensors = HashMap::with_capacity(content.tensor_infos.len());
    for name in content.tensor_infos.keys() {
        let tensor = content
            .tensor(&mut reader, name, device)
            .and_then(|quantized| quantized.dequantize(device))
            .map_err(candle_error)?;

        tensors.insert(name.clone(), tensor);
    }

    Ok(tensors)
}

/// Quantization Error
#[derive(thiserror::Error, Debug)]
pub enum QuantizeError {
    /// The crate was built without the `quantize` feature
    #[error("quantization support is not available in this build (enable the \"quantize\" feature)")]
    Unavailable,

    /// The quantized file could not be opened or created
    #[error("unable to access {}: {source}", path.display())]
    Io {
        /// The file that failed
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The quantized file could not be encoded or decoded
    #[error("invalid quantized weights in {}: {source}", path.display())]
    Candle {
        /// The file that failed
        path: PathBuf,
        /// The underlying Candle error
        source: candle_core::Error,
    },
}
