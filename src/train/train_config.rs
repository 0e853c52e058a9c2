use std::sync::mpsc;

use crate::error::{NnError, Result};
use crate::train::epoch_stats::EpochStats;

/// Configuration for a `stochastic_gradient_descent` run.
///
/// # Fields
/// - `epochs`: total number of full passes over the training data
/// - `batch_size`: samples per mini-batch; the last batch of an epoch may be smaller
/// - `learning_rate`: gradient-descent step size
/// - `progress_tx`: optional channel sender; one `EpochStats` is sent per
///   completed epoch. If the receiver is dropped the loop
///   stops after that epoch.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` with no progress channel.
    pub fn new(epochs: usize, batch_size: usize, learning_rate: f64) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            learning_rate,
            progress_tx: None,
        }
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(NnError::Configuration("batch_size must be at least 1".into()));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(NnError::Configuration(format!(
                "learning rate must be a positive finite number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_batch_size_and_learning_rate() {
        assert!(TrainConfig::new(30, 50, 0.9).validate().is_ok());
        assert!(TrainConfig::new(30, 0, 0.9).validate().is_err());
        assert!(TrainConfig::new(30, 50, -1.0).validate().is_err());
        assert!(TrainConfig::new(30, 50, f64::NAN).validate().is_err());
    }
}
