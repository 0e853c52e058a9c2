use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Serialize, Deserialize};
use tracing::info;

use crate::activation::activation::ActivationKind;
use crate::error::{NnError, Result};
use crate::layers::{Activation, FullyConnected, Layer};
use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// Format version written by `Network::snapshot`.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Versioned, self-describing copy of a network's parameters.
///
/// Forward caches and accumulated gradients are not part of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub version: u32,
    pub input_size: usize,
    pub layers: Vec<LayerSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSnapshot {
    FullyConnected { weights: Matrix, biases: Matrix },
    Activation { kind: ActivationKind, dim: usize },
}

impl Network {
    pub fn snapshot(&self) -> NetworkSnapshot {
        let layers = self.layers().iter()
            .map(|layer| match layer {
                Layer::FullyConnected(fc) => LayerSnapshot::FullyConnected {
                    weights: fc.weights.clone(),
                    biases: fc.biases.clone(),
                },
                Layer::Activation(act) => LayerSnapshot::Activation {
                    kind: act.kind(),
                    dim: act.dim(),
                },
            })
            .collect();
        NetworkSnapshot { version: SNAPSHOT_VERSION, input_size: self.input_size(), layers }
    }

    /// Rebuilds a network, re-checking every shape the snapshot claims.
    pub fn from_snapshot(snapshot: NetworkSnapshot) -> Result<Network> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(NnError::Configuration(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        let layers = snapshot.layers.into_iter()
            .enumerate()
            .map(|(index, layer)| {
                let built: Result<Layer> = match layer {
                    LayerSnapshot::FullyConnected { weights, biases } => check_rows(&weights)
                        .and_then(|_| check_rows(&biases))
                        .and_then(|_| FullyConnected::from_parameters(weights, biases))
                        .map(Layer::from),
                    LayerSnapshot::Activation { kind, dim } => Activation::new(kind, dim).map(Layer::from),
                };
                built.map_err(|e| e.at_layer(index, "snapshot"))
            })
            .collect::<Result<Vec<Layer>>>()?;
        Network::from_layers(snapshot.input_size, layers)
    }

    /// Serializes the network snapshot to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &self.snapshot())?;
        info!(path = %path.display(), layers = self.layers().len(), "saved network");
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Network> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let snapshot: NetworkSnapshot = serde_json::from_reader(reader)?;
        let network = Network::from_snapshot(snapshot)?;
        info!(path = %path.display(), layers = network.layers().len(), "loaded network");
        Ok(network)
    }
}

// Deserialized matrices bypass `Matrix::from_data`, so their declared shape is
// checked against the actual rows here.
fn check_rows(m: &Matrix) -> Result<()> {
    if m.data.len() != m.rows || m.data.iter().any(|r| r.len() != m.cols) {
        let actual_cols = m.data.first().map(|r| r.len()).unwrap_or(0);
        return Err(NnError::shape("snapshot matrix", m.shape(), (m.data.len(), actual_cols)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn net() -> Network {
        let mut rng = StdRng::seed_from_u64(21);
        let mut net = Network::new(3).unwrap();
        net.add_fc_layer(5, &mut rng).unwrap()
            .add_relu_layer().unwrap()
            .add_fc_layer(2, &mut rng).unwrap()
            .add_leaky_relu_layer(0.1).unwrap();
        net
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let original = net();
        let json = serde_json::to_string(&original.snapshot()).unwrap();
        let restored = Network::from_snapshot(serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(restored.snapshot(), original.snapshot());
    }

    #[test]
    fn rejects_unknown_version() {
        let mut snap = net().snapshot();
        snap.version = 99;
        assert!(matches!(Network::from_snapshot(snap), Err(NnError::Configuration(_))));
    }

    #[test]
    fn rejects_broken_chain() {
        let mut snap = net().snapshot();
        snap.layers.swap(0, 1);
        assert!(Network::from_snapshot(snap).is_err());
    }

    #[test]
    fn rejects_lying_matrix_header() {
        let mut snap = net().snapshot();
        if let LayerSnapshot::FullyConnected { weights, .. } = &mut snap.layers[0] {
            weights.data.pop();
        }
        let err = Network::from_snapshot(snap).unwrap_err();
        assert!(matches!(err.root(), NnError::ShapeMismatch { .. }));
    }
}
