use std::{collections::HashMap, path::Path};

use burn::tensor::{backend::Backend, Tensor as BurnTensor};
use candle_core::{Device, Tensor};

use super::ExportError;

/// A flat f32 tensor under its portable name
#[derive(Clone, Debug, PartialEq)]
pub struct NamedTensor {
    /// Hugging Face parameter name
    pub name: String,

    /// Row-major dimensions
    pub shape: Vec<usize>,

    /// Row-major values
    pub values: Vec<f32>,
}

impl NamedTensor {
    /// Copy a Burn tensor to the host
    pub fn from_burn<B: Backend, const D: usize>(name: String, tensor: BurnTensor<B, D>) -> Self {
        let shape = tensor.dims().to_vec();
        let values = tensor.into_data().convert::<f32>().value;

        Self {
            name,
            shape,
            values,
        }
    }

    /// Copy the values into a Candle tensor
    pub fn to_candle(&self, device: &Device) -> candle_core::Result<Tensor> {
        Tensor::from_slice(&self.values, self.shape.as_slice(), device)
    }
}

/// Write tensors to a safetensors file
///
/// Tensors are serialized in name order with no metadata, so the same weights always produce
/// the same bytes.
pub fn write_file(path: &Path, tensors: &[NamedTensor]) -> Result<(), ExportError> {
    let candle_error = |source| ExportError::Candle {
        path: path.to_path_buf(),
        source,
    };

    let device = Device::Cpu;
    let mut weights = HashMap::with_capacity(tensors.len());

    for tensor in tensors {
        weights.insert(
            tensor.name.clone(),
            tensor.to_candle(&device).map_err(candle_error)?,
        );
    }

    candle_core::safetensors::save(&weights, path).map_err(candle_error)
}

/// Read every tensor of a safetensors file
pub fn read_file(path: &Path, device: &Device) -> Result<HashMap<String, Tensor>, ExportError> {
    if !path.is_file() {
        return Err(ExportError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
    }

    candle_core::safetensors::load(path, device).map_err(|source| ExportError::Candle {
        path: path.to_path_buf(),
        source,
    })
}
