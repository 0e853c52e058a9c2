use crate::error::{NnError, Result};
use crate::layers::Layer;

/// Plain gradient-descent step over a stack of layers.
#[derive(Debug, Clone, Copy)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    /// Rejects non-finite or non-positive learning rates.
    pub fn new(learning_rate: f64) -> Result<Sgd> {
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(NnError::Configuration(format!(
                "learning rate must be a positive finite number, got {learning_rate}"
            )));
        }
        Ok(Sgd { learning_rate })
    }

    /// Applies the accumulated gradients of every layer, in order.
    pub fn step(&self, layers: &mut [Layer], reset: bool) -> Result<()> {
        for (index, layer) in layers.iter_mut().enumerate() {
            let kind = layer.kind_name();
            layer
                .update_parameters(self.learning_rate, reset)
                .map_err(|e| e.at_layer(index, kind))?;
        }
        Ok(())
    }
}
