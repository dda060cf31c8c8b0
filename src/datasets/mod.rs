use std::fmt::Display;

use crate::utils::{classes::ClassesError, files::JsonFileError};

/// Intent-labeled command datasets stored as a single JSON document
pub mod commands;

/// The named splits of a dataset file
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Split {
    /// Examples used for fine-tuning
    Train,

    /// Examples used to measure accuracy
    Validation,
}

impl Split {
    /// The key of this split within a dataset file
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Validation => "validation",
        }
    }
}

impl Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// The dataset file could not be read or parsed
    #[error(transparent)]
    File(#[from] JsonFileError),

    /// An example carries a label outside the vocabulary
    #[error("{split} split: {source}")]
    Labels {
        /// The split containing the bad example
        split: Split,
        /// The vocabulary lookup failure
        source: ClassesError,
    },
}
