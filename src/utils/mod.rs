/// File utilities
pub mod files;

/// Hugging Face utilities
pub mod hugging_face;

/// Tensor Utilities
pub mod tensors;

/// Renderer Utilities
pub mod renderer;

/// Utilities for classification tasks
pub mod classes;

/// Device selection
pub mod devices;
