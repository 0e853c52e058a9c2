use crate::data::{stack, Sample};
use crate::error::{NnError, Result};
use crate::loss::mse::MseLoss;
use crate::network::network::Network;

/// Inference-only metrics over a labelled set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub loss: f64,
    pub accuracy: f64,
    pub correct: usize,
    pub total: usize,
}

impl Network {
    /// Forward pass over the whole set as one batch; parameters are not touched.
    ///
    /// A sample counts as correct when the argmax of the output matches the
    /// argmax of its label.
    pub fn evaluate(&mut self, samples: &[Sample]) -> Result<Evaluation> {
        if samples.is_empty() {
            return Err(NnError::Configuration("cannot evaluate on an empty set".into()));
        }
        let (x, y) = stack(samples)?;
        let output = self.forward_pass(&x)?;
        let loss = MseLoss::new().forward(&output, &y)?;
        let correct = output.argmax_columns().iter()
            .zip(y.argmax_columns().iter())
            .filter(|(p, e)| p == e)
            .count();
        Ok(Evaluation {
            loss,
            accuracy: correct as f64 / samples.len() as f64,
            correct,
            total: samples.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::FullyConnected;
    use crate::math::matrix::Matrix;

    #[test]
    fn counts_argmax_matches() {
        let mut net = Network::new(2).unwrap();
        let identity = Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        net.add_layer(FullyConnected::from_parameters(identity, Matrix::zeros(2, 1)).unwrap()).unwrap();

        let samples = vec![
            Sample::from_slices(&[1.0, 0.0], &[1.0, 0.0]).unwrap(),
            Sample::from_slices(&[0.0, 1.0], &[0.0, 1.0]).unwrap(),
            Sample::from_slices(&[0.0, 1.0], &[1.0, 0.0]).unwrap(),
        ];
        let eval = net.evaluate(&samples).unwrap();
        assert_eq!(eval.correct, 2);
        assert_eq!(eval.total, 3);
        assert!((eval.accuracy - 2.0 / 3.0).abs() < 1e-12);
        // only the last sample is off: 2 squared errors of 1 over 6 elements
        assert!((eval.loss - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn empty_set_is_rejected() {
        let mut net = Network::new(2).unwrap();
        assert!(net.evaluate(&[]).is_err());
    }
}
