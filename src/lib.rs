//! A small feed-forward neural network engine with hand-derived gradients.
//!
//! Networks are built layer by layer (fully-connected, element-wise
//! activations), driven through explicit forward and backward passes, and
//! trained with mini-batch stochastic gradient descent against an MSE loss.
//! Samples are column vectors; a batch is a matrix whose columns are samples.

pub mod math;
pub mod error;
pub mod activation;
pub mod layers;
pub mod loss;
pub mod optim;
pub mod network;
pub mod data;
pub mod train;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use error::{NnError, Result};
pub use activation::activation::ActivationKind;
pub use layers::{Activation, FullyConnected, Layer};
pub use loss::mse::MseLoss;
pub use optim::sgd::Sgd;
pub use network::{Network, NetworkSnapshot, LayerSnapshot};
pub use data::Sample;
pub use train::{EpochStats, Evaluation, TrainConfig};
