use std::{
    collections::{BTreeMap, BTreeSet},
    hash::Hash,
};

/// Invert a map by swapping keys and values
pub fn invert_map<K, V, MK, MV>(original: MK) -> MV
where
    K: Ord + Hash + Eq,
    V: Ord + Hash + Eq + Clone,
    MK: IntoIterator<Item = (K, V)>,
    MV: FromIterator<(V, K)>,
{
    original
        .into_iter()
        .map(|(key, value)| (value, key))
        .collect()
}

/// A bijective mapping between class name labels and dense class ids (`0..N`)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Labels {
    id2label: BTreeMap<usize, String>,
    label2id: BTreeMap<String, usize>,
}

impl Labels {
    /// Build a vocabulary from every label seen, sorted so that ids are stable across runs
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();

        let id2label: BTreeMap<usize, String> = unique.into_iter().enumerate().collect();
        let label2id = invert_map(id2label.clone());

        Self { id2label, label2id }
    }

    /// Rebuild a vocabulary from a persisted `id2label` mapping
    pub fn from_id2label(id2label: BTreeMap<usize, String>) -> Result<Self, ClassesError> {
        for (expected, id) in id2label.keys().enumerate() {
            if *id != expected {
                return Err(ClassesError::Sparse(*id));
            }
        }

        let label2id: BTreeMap<String, usize> = invert_map(id2label.clone());
        if label2id.len() != id2label.len() {
            return Err(ClassesError::Duplicate);
        }

        Ok(Self { id2label, label2id })
    }

    /// The number of classes
    pub fn len(&self) -> usize {
        self.id2label.len()
    }

    /// Whether the vocabulary has no classes at all
    pub fn is_empty(&self) -> bool {
        self.id2label.is_empty()
    }

    /// Look up the id for a class label
    pub fn id(&self, label: &str) -> Result<usize, ClassesError> {
        self.label2id
            .get(label)
            .copied()
            .ok_or_else(|| ClassesError::UnknownLabel(label.to_string()))
    }

    /// Look up the class label for an id
    pub fn label(&self, id: usize) -> Option<&str> {
        self.id2label.get(&id).map(String::as_str)
    }

    /// Look up the class label for an id, falling back to the stringified id
    pub fn label_or_index(&self, id: usize) -> String {
        self.label(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    /// Class labels in id order
    pub fn names(&self) -> Vec<String> {
        self.id2label.values().cloned().collect()
    }

    /// A map from class ids to class name labels
    pub fn id2label(&self) -> &BTreeMap<usize, String> {
        &self.id2label
    }

    /// A map from class name labels to class ids
    pub fn label2id(&self) -> &BTreeMap<String, usize> {
        &self.label2id
    }
}

/// Label vocabulary errors
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ClassesError {
    /// A label that was never added to the vocabulary
    #[error("label {0:?} is not in the label vocabulary")]
    UnknownLabel(String),

    /// The persisted ids have gaps
    #[error("class ids must be dense, found unexpected id {0}")]
    Sparse(usize),

    /// Two ids share the same label
    #[error("class labels must be unique")]
    Duplicate,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_labels_are_sorted_and_dense() {
        let labels = Labels::from_labels(["rotate_image", "brighten_image", "draw_shape", "brighten_image"]);

        assert_eq!(labels.len(), 3);
        assert_eq!(
            labels.names(),
            vec!["brighten_image", "draw_shape", "rotate_image"]
        );
        assert_eq!(labels.id("draw_shape"), Ok(1));
    }

    #[test]
    fn test_labels_ignore_input_order() {
        let forward = Labels::from_labels(["a", "b", "c"]);
        let backward = Labels::from_labels(["c", "b", "a"]);

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_labels_round_trip() {
        let labels = Labels::from_labels(["greet", "draw_circle", "crop", "blur"]);

        for (label, id) in labels.label2id() {
            assert_eq!(labels.id2label()[id], *label);
        }
    }

    #[test]
    fn test_unknown_label() {
        let labels = Labels::from_labels(["greet"]);

        assert_eq!(
            labels.id("farewell"),
            Err(ClassesError::UnknownLabel("farewell".to_string()))
        );
    }

    #[test]
    fn test_label_or_index_falls_back() {
        let labels = Labels::from_labels(["greet", "farewell"]);

        assert_eq!(labels.label_or_index(1), "greet");
        assert_eq!(labels.label_or_index(7), "7");
    }

    #[test]
    fn test_from_id2label_validates() {
        let sparse = BTreeMap::from([(0, "a".to_string()), (2, "b".to_string())]);
        assert_eq!(Labels::from_id2label(sparse), Err(ClassesError::Sparse(2)));

        let duplicate = BTreeMap::from([(0, "a".to_string()), (1, "a".to_string())]);
        assert_eq!(
            Labels::from_id2label(duplicate),
            Err(ClassesError::Duplicate)
        );

        let valid = BTreeMap::from([(0, "a".to_string()), (1, "b".to_string())]);
        assert_eq!(
            Labels::from_id2label(valid),
            Ok(Labels::from_labels(["b", "a"]))
        );
    }

    #[test]
    fn test_labels_are_kept_verbatim() {
        let labels = Labels::from_labels(["greet", "greet "]);

        assert_eq!(labels.len(), 2);
        assert_eq!(labels.names(), vec!["greet", "greet "]);
        assert_eq!(labels.id("greet "), Ok(1));
        assert_eq!(
            labels.id(" greet"),
            Err(ClassesError::UnknownLabel(" greet".to_string()))
        );
    }

    #[test]
    fn test_single_label() {
        let labels = Labels::from_labels(["only", "only", "only"]);

        assert_eq!(labels.len(), 1);
        assert_eq!(labels.id("only"), Ok(0));
    }
}
