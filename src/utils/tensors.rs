use burn::tensor::{backend::Backend, Tensor};

/// Copy a 2D tensor of scores into one `Vec<f32>` per row
pub fn to_rows<B: Backend>(tensor: Tensor<B, 2>) -> Vec<Vec<f32>> {
    let [_, n_cols] = tensor.dims();
    let values = tensor.into_data().convert::<f32>().value;

    if n_cols == 0 {
        return Vec::new();
    }

    values.chunks(n_cols).map(<[f32]>::to_vec).collect()
}

/// Index of the highest score, with the first maximum winning ties
pub fn argmax(scores: &[f32]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &score)| match best {
            Some((_, top)) if score <= top => best,
            _ => Some((i, score)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use burn::backend::{ndarray::NdArrayDevice, NdArray};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[-3.0]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_to_rows() {
        let device = NdArrayDevice::Cpu;
        let tensor = Tensor::<NdArray, 2>::from_floats([[0.1, 0.9], [0.8, 0.2]], &device);

        assert_eq!(to_rows(tensor), vec![vec![0.1, 0.9], vec![0.8, 0.2]]);
    }
}
