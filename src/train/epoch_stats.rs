use serde::{Serialize, Deserialize};

/// Per-epoch training statistics produced by `stochastic_gradient_descent`.
///
/// One value is returned for every completed epoch, and also sent through
/// `TrainConfig::progress_tx` when a channel is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mini-batches processed in this epoch.
    pub batches: usize,
    /// Mean MSE over the epoch's mini-batches, weighted by batch size.
    pub train_loss: f64,
    /// MSE on the test set, if one was provided.
    pub test_loss: Option<f64>,
    /// Argmax accuracy on the test set as a fraction in [0, 1].
    pub test_accuracy: Option<f64>,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
