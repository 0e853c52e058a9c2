use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Mean-squared-error terminal layer.
///
/// Normalises by the total element count (rows × cols), not by batch size,
/// so a multi-output network sees the same numbers as a reference framework's
/// default `mean` reduction.
#[derive(Debug, Clone, Default)]
pub struct MseLoss {
    cache: Option<(Matrix, Matrix)>,
}

impl MseLoss {
    pub fn new() -> MseLoss {
        MseLoss { cache: None }
    }

    /// L = mean((Y - Ŷ)²) over every element.
    ///
    /// On a shape mismatch the previous cache is left untouched.
    pub fn forward(&mut self, predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        if predicted.shape() != expected.shape() {
            return Err(NnError::shape("mse forward", expected.shape(), predicted.shape()));
        }
        let n = (expected.rows * expected.cols) as f64;
        let loss = expected.sub(predicted)?.map(|d| d * d).sum() / n;
        self.cache = Some((predicted.clone(), expected.clone()));
        Ok(loss)
    }

    /// dL/dŶ = 2 / (rows·cols) · (Ŷ - Y); seeds the network's backward pass.
    pub fn backward(&mut self) -> Result<Matrix> {
        let (predicted, expected) = self.cache.take().ok_or_else(|| {
            NnError::State("mse backward called without a preceding forward".into())
        })?;
        let n = (expected.rows * expected.cols) as f64;
        Ok(predicted.sub(&expected)?.scale(2.0 / n))
    }

    /// The loss has no parameters.
    pub fn update_parameters(&mut self, _learning_rate: f64, _reset: bool) {}

    /// The (Ŷ, Y) pair cached by the last forward, if any.
    pub fn cached(&self) -> Option<(&Matrix, &Matrix)> {
        self.cache.as_ref().map(|(p, e)| (p, e))
    }
}
