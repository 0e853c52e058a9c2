pub mod activation;
pub mod dense;

pub use activation::Activation;
pub use dense::FullyConnected;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Every layer a `Network` can hold.
///
/// The contract shared by all variants:
/// - `forward` caches what the matching `backward` needs;
/// - `backward` turns dL/d(output) into dL/d(input), accumulating parameter
///   gradients on the way, and fails with `State` when no forward preceded it;
/// - `update_parameters` applies `param -= lr * grad / batch` and is a no-op
///   for parameter-free layers.
#[derive(Debug, Clone)]
pub enum Layer {
    FullyConnected(FullyConnected),
    Activation(Activation),
}

impl Layer {
    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        match self {
            Layer::FullyConnected(fc) => fc.forward(input),
            Layer::Activation(act) => act.forward(input),
        }
    }

    pub fn backward(&mut self, upstream: &Matrix) -> Result<Matrix> {
        match self {
            Layer::FullyConnected(fc) => fc.backward(upstream),
            Layer::Activation(act) => act.backward(upstream),
        }
    }

    pub fn update_parameters(&mut self, learning_rate: f64, reset: bool) -> Result<()> {
        if !learning_rate.is_finite() {
            return Err(NnError::Configuration(format!(
                "learning rate must be finite, got {learning_rate}"
            )));
        }
        match self {
            Layer::FullyConnected(fc) => fc.update_parameters(learning_rate, reset),
            Layer::Activation(_) => Ok(()),
        }
    }

    pub fn input_size(&self) -> usize {
        match self {
            Layer::FullyConnected(fc) => fc.input_size(),
            Layer::Activation(act) => act.dim(),
        }
    }

    pub fn output_size(&self) -> usize {
        match self {
            Layer::FullyConnected(fc) => fc.output_size(),
            Layer::Activation(act) => act.dim(),
        }
    }

    /// Short type name used in error context and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Layer::FullyConnected(_) => "fully_connected",
            Layer::Activation(act) => act.kind().name(),
        }
    }
}

impl From<FullyConnected> for Layer {
    fn from(fc: FullyConnected) -> Layer {
        Layer::FullyConnected(fc)
    }
}

impl From<Activation> for Layer {
    fn from(act: Activation) -> Layer {
        Layer::Activation(act)
    }
}
