use crate::activation::activation::ActivationKind;
use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Element-wise activation applied to a (dim × batch) matrix.
///
/// Holds no parameters; the only state is the output of the last forward,
/// which the matching backward consumes.
#[derive(Debug, Clone)]
pub struct Activation {
    kind: ActivationKind,
    dim: usize,
    cached_output: Option<Matrix>,
}

impl Activation {
    pub fn new(kind: ActivationKind, dim: usize) -> Result<Activation> {
        kind.validate()?;
        if dim == 0 {
            return Err(NnError::Configuration(format!("{kind} layer needs a non-zero width")));
        }
        Ok(Activation { kind, dim, cached_output: None })
    }

    pub fn kind(&self) -> ActivationKind {
        self.kind
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        if input.rows != self.dim || input.cols == 0 {
            return Err(NnError::shape(
                format!("{} forward", self.kind),
                (self.dim, input.cols.max(1)),
                input.shape(),
            ));
        }
        let kind = self.kind;
        let a = input.map(|z| kind.function(z));
        self.cached_output = Some(a.clone());
        Ok(a)
    }

    /// dL/dZ = g'(Z) ⊙ dL/dA, with g' written in terms of the cached A.
    pub fn backward(&mut self, upstream: &Matrix) -> Result<Matrix> {
        let output = self.cached_output.as_ref().ok_or_else(|| {
            NnError::State(format!("{} backward called without a preceding forward", self.kind))
        })?;
        if upstream.shape() != output.shape() {
            return Err(NnError::shape(
                format!("{} backward", self.kind),
                output.shape(),
                upstream.shape(),
            ));
        }
        let kind = self.kind;
        let d_input = output.map(|a| kind.derivative_from_output(a)).hadamard(upstream)?;
        self.cached_output = None;
        Ok(d_input)
    }
}
