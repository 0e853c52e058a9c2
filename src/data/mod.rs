pub mod clusters;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// One training example: a (feature_dim × 1) column and its (label_dim × 1) target.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub features: Matrix,
    pub label: Matrix,
}

impl Sample {
    /// Both matrices must be single columns.
    pub fn new(features: Matrix, label: Matrix) -> Result<Sample> {
        if features.cols != 1 || features.rows == 0 {
            return Err(NnError::shape("sample features", (features.rows.max(1), 1), features.shape()));
        }
        if label.cols != 1 || label.rows == 0 {
            return Err(NnError::shape("sample label", (label.rows.max(1), 1), label.shape()));
        }
        Ok(Sample { features, label })
    }

    pub fn from_slices(features: &[f64], label: &[f64]) -> Result<Sample> {
        Sample::new(Matrix::column(features), Matrix::column(label))
    }
}

/// Stacks samples column-wise into a feature batch X and a label batch Y.
pub fn stack(samples: &[Sample]) -> Result<(Matrix, Matrix)> {
    let features: Vec<Matrix> = samples.iter().map(|s| s.features.clone()).collect();
    let labels: Vec<Matrix> = samples.iter().map(|s| s.label.clone()).collect();
    Ok((Matrix::from_columns(&features)?, Matrix::from_columns(&labels)?))
}

/// An n×1 column with a 1.0 at `class`.
pub fn one_hot(class: usize, n_classes: usize) -> Result<Matrix> {
    if class >= n_classes {
        return Err(NnError::Configuration(format!(
            "class {class} out of range for {n_classes} classes"
        )));
    }
    let mut label = Matrix::zeros(n_classes, 1);
    label.data[class][0] = 1.0;
    Ok(label)
}
