use std::path::Path;

use burn::data::dataset::InMemDataset;
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::{
    pipelines::text_classification,
    utils::{classes::Labels, files::read_json},
};

use super::{DatasetError, Split};

/// The default location of the dataset file
pub static DEFAULT_DATA_FILE: &str = "commands.json";

/// A labeled command, as it appears in the dataset file
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, new)]
pub struct Item {
    /// The text for classification
    pub text: String,

    /// The intent class name of the text
    pub label: String,
}

/// A command whose intent label has been mapped to its class id
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, new)]
pub struct Encoded {
    /// The text for classification
    pub text: String,

    /// The intent class id of the text
    pub label: usize,
}

impl text_classification::Item for Encoded {
    fn input(&self) -> &str {
        &self.text
    }

    fn class_id(&self) -> usize {
        self.label
    }
}

/// Both splits of a dataset file: `{ "train": [...], "validation": [...] }`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, new)]
pub struct Splits {
    /// Examples used for fine-tuning
    pub train: Vec<Item>,

    /// Examples used to measure accuracy
    pub validation: Vec<Item>,
}

impl Splits {
    /// Read both splits from a dataset file
    pub async fn load(path: &Path) -> Result<Self, DatasetError> {
        let splits: Splits = read_json(path).await?;

        log::info!(
            "Loaded {} training and {} validation examples from {}",
            splits.train.len(),
            splits.validation.len(),
            path.display()
        );

        Ok(splits)
    }

    /// The examples of a single split
    pub fn split(&self, split: Split) -> &[Item] {
        match split {
            Split::Train => &self.train,
            Split::Validation => &self.validation,
        }
    }

    /// The label vocabulary built from the union of labels across both splits
    pub fn labels(&self) -> Labels {
        Labels::from_labels(
            self.train
                .iter()
                .chain(self.validation.iter())
                .map(|item| item.label.as_str()),
        )
    }

    /// Map each example's label in a split to its class id
    pub fn encode(&self, split: Split, labels: &Labels) -> Result<InMemDataset<Encoded>, DatasetError> {
        let items = self
            .split(split)
            .iter()
            .map(|item| {
                labels
                    .id(&item.label)
                    .map(|id| Encoded::new(item.text.clone(), id))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| DatasetError::Labels { split, source })?;

        Ok(InMemDataset::new(items))
    }
}
