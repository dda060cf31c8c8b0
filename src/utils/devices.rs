use burn::backend::libtorch::LibTorchDevice;

/// The first CUDA device when libtorch can see one, otherwise the CPU
pub fn default_device() -> LibTorchDevice {
    if tch::Cuda::is_available() {
        LibTorchDevice::Cuda(0)
    } else {
        log::warn!("CUDA is not available, falling back to the CPU");

        LibTorchDevice::Cpu
    }
}
