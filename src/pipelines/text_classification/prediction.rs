use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::utils::{classes::Labels, tensors::argmax};

/// The predicted intent for a single input text
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// The input text
    pub text: String,

    /// The predicted class id
    pub index: usize,

    /// The predicted class label, or the stringified id if the vocabulary has no entry for it
    pub label: String,
}

impl Prediction {
    /// Pick the highest scoring class and resolve its label
    pub fn from_scores(text: &str, scores: &[f32], labels: &Labels) -> Result<Self, PredictError> {
        let index = argmax(scores).ok_or(PredictError::NoScores)?;

        Ok(Self {
            text: text.to_string(),
            index,
            label: labels.label_or_index(index),
        })
    }
}

impl Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Input: {}\nPredicted label: {}", self.text, self.label)
    }
}

/// A loaded classifier that can be asked for predictions any number of times
pub trait Predict {
    /// Class probabilities for a single input text, in class id order
    fn scores(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// The label vocabulary the classifier was trained with
    fn labels(&self) -> &Labels;

    /// Predict the class of a single input text
    fn predict(&self, text: &str) -> anyhow::Result<Prediction> {
        let scores = self.scores(text)?;

        Ok(Prediction::from_scores(text, &scores, self.labels())?)
    }

    /// Predict the class label of a single input text
    fn predict_label(&self, text: &str) -> anyhow::Result<String> {
        Ok(self.predict(text)?.label)
    }
}

/// Prediction Error
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PredictError {
    /// The tokenizer produced no tokens, not even special ones
    #[error("input text produced no tokens")]
    NoTokens,

    /// The model produced no class scores
    #[error("the model returned no class scores")]
    NoScores,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct Fixed {
        scores: Vec<f32>,
        labels: Labels,
    }

    impl Predict for Fixed {
        fn scores(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
            Ok(self.scores.clone())
        }

        fn labels(&self) -> &Labels {
            &self.labels
        }
    }

    #[test]
    fn test_predict_label() {
        let predictor = Fixed {
            scores: vec![0.1, 0.8, 0.1],
            labels: Labels::from_labels(["blur_image", "brighten_image", "crop_image"]),
        };

        assert_eq!(
            predictor.predict_label("brighten image by 20%").unwrap(),
            "brighten_image"
        );
    }

    #[test]
    fn test_missing_label_falls_back_to_index() {
        // The vocabulary lost an entry, but the model still scores three classes
        let predictor = Fixed {
            scores: vec![0.1, 0.2, 0.7],
            labels: Labels::from_labels(["blur_image", "brighten_image"]),
        };

        let prediction = predictor.predict("crop it").unwrap();

        assert_eq!(prediction.index, 2);
        assert_eq!(prediction.label, "2");
    }

    #[test]
    fn test_empty_input_is_classified() {
        let predictor = Fixed {
            scores: vec![0.3, 0.7],
            labels: Labels::from_labels(["blur_image", "crop_image"]),
        };

        assert_eq!(predictor.predict_label("").unwrap(), "crop_image");
        assert_eq!(predictor.predict_label("   ").unwrap(), "crop_image");
    }

    #[test]
    fn test_no_scores() {
        let predictor = Fixed {
            scores: vec![],
            labels: Labels::from_labels(["only"]),
        };

        let err = predictor.predict("draw").unwrap_err();

        assert_eq!(
            err.downcast_ref::<PredictError>(),
            Some(&PredictError::NoScores)
        );
    }

    #[test]
    fn test_display() {
        let prediction = Prediction {
            text: "draw a red circle".to_string(),
            index: 0,
            label: "draw_shape".to_string(),
        };

        assert_eq!(
            prediction.to_string(),
            "Input: draw a red circle\nPredicted label: draw_shape"
        );
    }
}
