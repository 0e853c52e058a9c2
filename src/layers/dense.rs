use rand::Rng;
use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Fully-connected (affine) layer: `Z = W·X + B`.
///
/// `W` is (out × in), `B` is (out × 1), and inputs are (in × batch). Gradients
/// are summed over the batch during `backward` and only averaged when
/// `update_parameters` applies them.
#[derive(Debug, Clone)]
pub struct FullyConnected {
    input_size: usize,
    output_size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    weights_grad: Option<Matrix>,
    biases_grad: Option<Matrix>,
    // Backward passes folded into the gradients since the last reset.
    accumulated_passes: usize,
    // Input of the last forward; valid until the matching backward consumes it.
    cached_input: Option<Matrix>,
}

impl FullyConnected {
    /// Random weights scaled by 1/sqrt(input_size), zero biases.
    pub fn new<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> Result<FullyConnected> {
        if input_size == 0 || output_size == 0 {
            return Err(NnError::Configuration(format!(
                "fully-connected layer needs non-zero widths, got {input_size} -> {output_size}"
            )));
        }
        let weights = Matrix::xavier(output_size, input_size, rng);
        let biases = Matrix::zeros(output_size, 1);
        Ok(FullyConnected::assemble(weights, biases))
    }

    /// Builds a layer around explicit parameters, e.g. copied from another framework.
    pub fn from_parameters(weights: Matrix, biases: Matrix) -> Result<FullyConnected> {
        if weights.rows == 0 || weights.cols == 0 {
            return Err(NnError::Configuration("fully-connected weights must be non-empty".into()));
        }
        if biases.shape() != (weights.rows, 1) {
            return Err(NnError::shape("FullyConnected biases", (weights.rows, 1), biases.shape()));
        }
        Ok(FullyConnected::assemble(weights, biases))
    }

    fn assemble(weights: Matrix, biases: Matrix) -> FullyConnected {
        FullyConnected {
            input_size: weights.cols,
            output_size: weights.rows,
            weights,
            biases,
            weights_grad: None,
            biases_grad: None,
            accumulated_passes: 0,
            cached_input: None,
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Accumulated dL/dW; zeros when nothing has been accumulated.
    pub fn weights_grad(&self) -> Matrix {
        self.weights_grad.clone()
            .unwrap_or_else(|| Matrix::zeros(self.output_size, self.input_size))
    }

    /// Accumulated dL/dB; zeros when nothing has been accumulated.
    pub fn biases_grad(&self) -> Matrix {
        self.biases_grad.clone()
            .unwrap_or_else(|| Matrix::zeros(self.output_size, 1))
    }

    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        if input.rows != self.input_size || input.cols == 0 {
            return Err(NnError::shape(
                "fully-connected forward",
                (self.input_size, input.cols.max(1)),
                input.shape(),
            ));
        }
        let z = self.weights.dot(input)?.add_column_broadcast(&self.biases)?;
        self.cached_input = Some(input.clone());
        Ok(z)
    }

    pub fn backward(&mut self, upstream: &Matrix) -> Result<Matrix> {
        let input = self.cached_input.as_ref().ok_or_else(|| {
            NnError::State("fully-connected backward called without a preceding forward".into())
        })?;
        if upstream.shape() != (self.output_size, input.cols) {
            return Err(NnError::shape(
                "fully-connected backward",
                (self.output_size, input.cols),
                upstream.shape(),
            ));
        }

        let d_weights = upstream.dot(&input.transpose())?;
        let d_biases = upstream.row_sums();
        let d_input = self.weights.transpose().dot(upstream)?;

        self.weights_grad = Some(match self.weights_grad.take() {
            Some(acc) => acc.add(&d_weights)?,
            None => d_weights,
        });
        self.biases_grad = Some(match self.biases_grad.take() {
            Some(acc) => acc.add(&d_biases)?,
            None => d_biases,
        });
        self.accumulated_passes += 1;
        self.cached_input = None;

        Ok(d_input)
    }

    /// `param -= learning_rate * grad / passes`, where `passes` counts the
    /// backward calls accumulated since the last reset. Each pass is already
    /// a mean over its batch (the loss seed is normalised), so one pass per
    /// mini-batch applies the batch gradient as is, and accumulating several
    /// passes with `reset = false` averages them.
    ///
    /// Both new parameter tensors are computed before either is assigned.
    pub fn update_parameters(&mut self, learning_rate: f64, reset: bool) -> Result<()> {
        if self.accumulated_passes > 0 {
            let step = learning_rate / self.accumulated_passes as f64;
            let new_weights = self.weights.sub(&self.weights_grad().scale(step))?;
            let new_biases = self.biases.sub(&self.biases_grad().scale(step))?;
            self.weights = new_weights;
            self.biases = new_biases;
        }
        if reset {
            self.weights_grad = Some(Matrix::zeros(self.output_size, self.input_size));
            self.biases_grad = Some(Matrix::zeros(self.output_size, 1));
            self.accumulated_passes = 0;
        }
        Ok(())
    }
}
