use std::fmt::Display;

use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    tensor::backend::Backend,
    train::{ClassificationOutput, ValidStep},
};
use serde::{Deserialize, Serialize};

use crate::utils::tensors::{argmax, to_rows};

use super::{batcher::Train, Batcher, Item};

/// Accuracy of a model over a labeled split
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    /// Fraction of examples whose predicted class id equals the true class id
    pub accuracy: f64,

    /// Number of correctly classified examples
    pub correct: usize,

    /// Number of examples evaluated
    pub total: usize,
}

impl EvalReport {
    /// Compare predicted class ids against the true class ids
    pub fn from_predictions(predictions: &[usize], targets: &[usize]) -> Self {
        let total = predictions.len().min(targets.len());
        let correct = predictions
            .iter()
            .zip(targets)
            .filter(|(predicted, expected)| predicted == expected)
            .count();

        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        };

        Self {
            accuracy,
            correct,
            total,
        }
    }
}

impl Display for EvalReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "accuracy {:.4} ({}/{})",
            self.accuracy, self.correct, self.total
        )
    }
}

/// Run a model over every example in a dataset and measure its accuracy
pub fn evaluate<B, M, I, D>(model: &M, batcher: Batcher<B>, dataset: D, batch_size: usize) -> EvalReport
where
    B: Backend,
    M: ValidStep<Train<B>, ClassificationOutput<B>>,
    I: Item + 'static,
    D: Dataset<I> + 'static,
{
    let dataloader = DataLoaderBuilder::<I, Train<B>>::new(batcher)
        .batch_size(batch_size)
        .build(dataset);

    let mut predictions = Vec::new();
    let mut targets = Vec::new();

    for batch in dataloader.iter() {
        let output = model.step(batch);

        predictions.extend(
            to_rows(output.output)
                .iter()
                .map(|scores| argmax(scores).unwrap_or_default()),
        );
        targets.extend(
            output
                .targets
                .into_data()
                .convert::<i64>()
                .value
                .into_iter()
                .map(|id| id as usize),
        );
    }

    EvalReport::from_predictions(&predictions, &targets)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_accuracy() {
        let report = EvalReport::from_predictions(&[0, 1, 2, 2], &[0, 1, 1, 2]);

        assert_eq!(
            report,
            EvalReport {
                accuracy: 0.75,
                correct: 3,
                total: 4,
            }
        );
    }

    #[test]
    fn test_accuracy_of_nothing() {
        assert_eq!(EvalReport::from_predictions(&[], &[]), EvalReport::default());
    }
}
