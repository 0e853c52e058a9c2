use thiserror::Error;

/// Errors raised by layers, the network and the training loop.
///
/// Nothing in the crate retries or recovers from these; they abort the
/// current call and surface to whoever drove it.
#[derive(Debug, Error)]
pub enum NnError {
    #[error("shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("invalid layer state: {0}")]
    State(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("layer {index} ({kind}) failed: {source}")]
    AtLayer {
        index: usize,
        kind: String,
        #[source]
        source: Box<NnError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NnError>;

impl NnError {
    pub(crate) fn shape(
        context: impl Into<String>,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> NnError {
        NnError::ShapeMismatch { context: context.into(), expected, actual }
    }

    /// Tags an error with the position and type of the layer it came from.
    pub(crate) fn at_layer(self, index: usize, kind: &str) -> NnError {
        NnError::AtLayer { index, kind: kind.to_string(), source: Box::new(self) }
    }

    /// The underlying cause with any `AtLayer` wrapping peeled off.
    pub fn root(&self) -> &NnError {
        match self {
            NnError::AtLayer { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_unwraps_nested_layer_context() {
        let err = NnError::shape("relu", (3, 1), (2, 1))
            .at_layer(1, "relu")
            .at_layer(0, "network");
        assert!(matches!(err.root(), NnError::ShapeMismatch { expected: (3, 1), .. }));
        assert!(err.to_string().contains("layer 0"));
    }
}
