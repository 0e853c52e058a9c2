use std::ops::Range;
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::data::Sample;
use crate::error::{NnError, Result};
use crate::loss::mse::MseLoss;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Contiguous index ranges covering `0..n` in chunks of `batch_size`.
///
/// Yields `ceil(n / batch_size)` ranges; the last one holds `n % batch_size`
/// indices when that is non-zero.
pub fn batch_ranges(n: usize, batch_size: usize) -> Result<Vec<Range<usize>>> {
    if batch_size == 0 {
        return Err(NnError::Configuration("batch_size must be at least 1".into()));
    }
    Ok((0..n)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(n))
        .collect())
}

impl Network {
    /// Mini-batch stochastic gradient descent with an MSE loss.
    ///
    /// Every epoch shuffles the training order with `rng`, then for each
    /// mini-batch runs forward, loss, backward and a resetting parameter
    /// update, in that order. When `test_data` is given and non-empty it is
    /// evaluated after each epoch without touching the parameters.
    ///
    /// All samples are shape-checked against the network before the first
    /// update, so a malformed dataset fails without modifying any weights.
    pub fn stochastic_gradient_descent<R: Rng + ?Sized>(
        &mut self,
        training_data: &[Sample],
        config: &TrainConfig,
        test_data: Option<&[Sample]>,
        rng: &mut R,
    ) -> Result<Vec<EpochStats>> {
        config.validate()?;
        if training_data.is_empty() {
            return Err(NnError::Configuration("training data must not be empty".into()));
        }
        self.check_samples(training_data, "training")?;
        let test_data = match test_data {
            Some([]) => {
                warn!("test set is empty; skipping evaluation");
                None
            }
            Some(samples) => {
                self.check_samples(samples, "test")?;
                Some(samples)
            }
            None => None,
        };

        let mut history = Vec::with_capacity(config.epochs);

        for epoch in 1..=config.epochs {
            let t_start = Instant::now();

            // ── One full pass over the training data ───────────────────────
            let (train_loss, batches) = self.run_one_epoch(training_data, config, rng)?;

            // ── Evaluation ────────────────────────────────────────────────
            let evaluation = match test_data {
                Some(samples) => Some(self.evaluate(samples)?),
                None => None,
            };

            let stats = EpochStats {
                epoch,
                total_epochs: config.epochs,
                batches,
                train_loss,
                test_loss: evaluation.map(|e| e.loss),
                test_accuracy: evaluation.map(|e| e.accuracy),
                elapsed_ms: t_start.elapsed().as_millis() as u64,
            };

            match evaluation {
                Some(e) => info!(
                    "Epoch {epoch}: {} / {} correct, test loss {:.6}, train loss {train_loss:.6}",
                    e.correct, e.total, e.loss
                ),
                None => info!("Epoch {epoch} complete, train loss {train_loss:.6}"),
            }

            history.push(stats.clone());

            // ── Emit progress ─────────────────────────────────────────────
            if let Some(ref tx) = config.progress_tx {
                if tx.send(stats).is_err() {
                    info!("progress receiver dropped; stopping after epoch {epoch}");
                    break;
                }
            }
        }

        Ok(history)
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

impl Network {
    /// Runs one full epoch of mini-batch SGD over the training data.
    /// Returns the batch-size-weighted mean loss and the number of batches.
    fn run_one_epoch<R: Rng + ?Sized>(
        &mut self,
        samples: &[Sample],
        config: &TrainConfig,
        rng: &mut R,
    ) -> Result<(f64, usize)> {
        let n = samples.len();
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(rng);

        let ranges = batch_ranges(n, config.batch_size)?;
        let mut loss_layer = MseLoss::new();
        let mut total_loss = 0.0;

        for range in &ranges {
            let batch = &indices[range.clone()];
            let (x, y) = gather(samples, batch)?;

            let output = self.forward_pass(&x)?;
            total_loss += loss_layer.forward(&output, &y)? * batch.len() as f64;
            let seed = loss_layer.backward()?;
            self.backward_pass(&seed)?;
            self.update_parameters(config.learning_rate, true)?;
        }
        debug!(batches = ranges.len(), samples = n, "epoch finished");

        Ok((total_loss / n as f64, ranges.len()))
    }

    fn check_samples(&self, samples: &[Sample], set: &str) -> Result<()> {
        for (i, sample) in samples.iter().enumerate() {
            if sample.features.shape() != (self.input_size(), 1) {
                return Err(NnError::shape(
                    format!("{set} sample {i} features"),
                    (self.input_size(), 1),
                    sample.features.shape(),
                ));
            }
            if sample.label.shape() != (self.output_width(), 1) {
                return Err(NnError::shape(
                    format!("{set} sample {i} label"),
                    (self.output_width(), 1),
                    sample.label.shape(),
                ));
            }
        }
        Ok(())
    }
}

/// Stacks the selected samples into (X, Y) batch matrices.
fn gather(samples: &[Sample], indices: &[usize]) -> Result<(Matrix, Matrix)> {
    let features: Vec<Matrix> = indices.iter().map(|&i| samples[i].features.clone()).collect();
    let labels: Vec<Matrix> = indices.iter().map(|&i| samples[i].label.clone()).collect();
    Ok((Matrix::from_columns(&features)?, Matrix::from_columns(&labels)?))
}
