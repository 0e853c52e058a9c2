use rand::Rng;
use tracing::debug;

use crate::activation::activation::ActivationKind;
use crate::error::{NnError, Result};
use crate::layers::{Activation, FullyConnected, Layer};
use crate::math::matrix::Matrix;
use crate::optim::sgd::Sgd;

/// An ordered stack of layers driven forward and backward as one unit.
///
/// The network tracks the width of its current output while it is being
/// built, so each `add_*` helper only needs the new layer's own width.
#[derive(Debug, Clone)]
pub struct Network {
    input_size: usize,
    output_width: usize,
    layers: Vec<Layer>,
}

impl Network {
    /// An empty network accepting `input_size`-row inputs.
    pub fn new(input_size: usize) -> Result<Network> {
        if input_size == 0 {
            return Err(NnError::Configuration("network input width must be non-zero".into()));
        }
        Ok(Network { input_size, output_width: input_size, layers: Vec::new() })
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Width of the last layer's output (the input width when empty).
    pub fn output_width(&self) -> usize {
        self.output_width
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Appends a pre-built layer. Its input width must match the current output width.
    pub fn add_layer(&mut self, layer: impl Into<Layer>) -> Result<&mut Network> {
        let layer = layer.into();
        if layer.input_size() != self.output_width {
            return Err(NnError::shape(
                format!("appending {} layer {}", layer.kind_name(), self.layers.len()),
                (self.output_width, 1),
                (layer.input_size(), 1),
            ));
        }
        debug!(
            index = self.layers.len(),
            kind = layer.kind_name(),
            input = layer.input_size(),
            output = layer.output_size(),
            "appended layer"
        );
        self.output_width = layer.output_size();
        self.layers.push(layer);
        Ok(self)
    }

    /// Appends a fully-connected layer with `width` outputs, initialised from `rng`.
    pub fn add_fc_layer<R: Rng + ?Sized>(&mut self, width: usize, rng: &mut R) -> Result<&mut Network> {
        let fc = FullyConnected::new(self.output_width, width, rng)?;
        self.add_layer(fc)
    }

    pub fn add_activation_layer(&mut self, kind: ActivationKind) -> Result<&mut Network> {
        let act = Activation::new(kind, self.output_width)?;
        self.add_layer(act)
    }

    pub fn add_sigmoid_layer(&mut self) -> Result<&mut Network> {
        self.add_activation_layer(ActivationKind::Sigmoid)
    }

    pub fn add_relu_layer(&mut self) -> Result<&mut Network> {
        self.add_activation_layer(ActivationKind::ReLU)
    }

    pub fn add_tanh_layer(&mut self) -> Result<&mut Network> {
        self.add_activation_layer(ActivationKind::Tanh)
    }

    pub fn add_leaky_relu_layer(&mut self, alpha: f64) -> Result<&mut Network> {
        self.add_activation_layer(ActivationKind::LeakyReLU { alpha })
    }

    /// Runs every layer's forward in order. No loss is applied.
    pub fn forward_pass(&mut self, input: &Matrix) -> Result<Matrix> {
        if input.rows != self.input_size || input.cols == 0 {
            return Err(NnError::shape(
                "network input",
                (self.input_size, input.cols.max(1)),
                input.shape(),
            ));
        }
        let mut current = input.clone();
        for (index, layer) in self.layers.iter_mut().enumerate() {
            current = layer
                .forward(&current)
                .map_err(|e| e.at_layer(index, layer.kind_name()))?;
        }
        Ok(current)
    }

    /// Runs every layer's backward in reverse order, seeded with dL/d(output).
    /// Returns dL/d(input).
    pub fn backward_pass(&mut self, loss_gradient: &Matrix) -> Result<Matrix> {
        let mut current = loss_gradient.clone();
        for (index, layer) in self.layers.iter_mut().enumerate().rev() {
            current = layer
                .backward(&current)
                .map_err(|e| e.at_layer(index, layer.kind_name()))?;
        }
        Ok(current)
    }

    /// One gradient-descent step on every layer.
    ///
    /// The learning rate is validated before any layer is touched.
    pub fn update_parameters(&mut self, learning_rate: f64, reset: bool) -> Result<()> {
        Sgd::new(learning_rate)?.step(&mut self.layers, reset)
    }

    /// Argmax class for every column of `input`.
    pub fn predict(&mut self, input: &Matrix) -> Result<Vec<usize>> {
        Ok(self.forward_pass(input)?.argmax_columns())
    }

    pub(crate) fn from_layers(input_size: usize, layers: Vec<Layer>) -> Result<Network> {
        let mut network = Network::new(input_size)?;
        for layer in layers {
            network.add_layer(layer)?;
        }
        Ok(network)
    }
}
