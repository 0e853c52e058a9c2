use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{NnError, Result};

/// Element-wise nonlinearities available as standalone layers.
///
/// Backward passes are expressed in terms of the cached *output* `A`, so the
/// activation layer never needs to keep its pre-activation input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationKind {
    Sigmoid,
    #[serde(rename = "relu")]
    ReLU,
    Tanh,
    #[serde(rename = "leaky_relu")]
    LeakyReLU { alpha: f64 },
}

impl ActivationKind {
    /// Slope used by `"leaky_relu"` when parsed from a string.
    pub const DEFAULT_LEAKY_ALPHA: f64 = 0.01;

    /// Rejects parameterised kinds whose parameters make no sense.
    pub fn validate(&self) -> Result<()> {
        match self {
            ActivationKind::LeakyReLU { alpha } if !(alpha.is_finite() && *alpha > 0.0 && *alpha < 1.0) => {
                Err(NnError::Configuration(format!(
                    "leaky relu slope must lie in (0, 1), got {alpha}"
                )))
            }
            _ => Ok(()),
        }
    }

    /// A = g(Z)
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationKind::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationKind::ReLU => x.max(0.0),
            ActivationKind::Tanh => x.tanh(),
            ActivationKind::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
        }
    }

    /// dA/dZ evaluated from the activation output `a`.
    ///
    /// ReLU-style kinks take the subgradient of the left side (0 for ReLU).
    pub fn derivative_from_output(&self, a: f64) -> f64 {
        match self {
            ActivationKind::Sigmoid => a * (1.0 - a),
            ActivationKind::ReLU => if a > 0.0 { 1.0 } else { 0.0 },
            ActivationKind::Tanh => 1.0 - a * a,
            ActivationKind::LeakyReLU { alpha } => if a > 0.0 { 1.0 } else { *alpha },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivationKind::Sigmoid => "sigmoid",
            ActivationKind::ReLU => "relu",
            ActivationKind::Tanh => "tanh",
            ActivationKind::LeakyReLU { .. } => "leaky_relu",
        }
    }
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActivationKind {
    type Err = NnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sigmoid" => Ok(ActivationKind::Sigmoid),
            "relu" => Ok(ActivationKind::ReLU),
            "tanh" => Ok(ActivationKind::Tanh),
            "leaky_relu" | "leakyrelu" => Ok(ActivationKind::LeakyReLU {
                alpha: ActivationKind::DEFAULT_LEAKY_ALPHA,
            }),
            other => Err(NnError::Configuration(format!("unknown activation kind '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds() {
        assert_eq!("Sigmoid".parse::<ActivationKind>().unwrap(), ActivationKind::Sigmoid);
        assert_eq!("relu".parse::<ActivationKind>().unwrap(), ActivationKind::ReLU);
        assert_eq!(
            "leaky_relu".parse::<ActivationKind>().unwrap(),
            ActivationKind::LeakyReLU { alpha: 0.01 }
        );
    }

    #[test]
    fn unknown_kind_is_configuration_error() {
        assert!(matches!("softplus".parse::<ActivationKind>(), Err(NnError::Configuration(_))));
    }

    #[test]
    fn leaky_slope_is_validated() {
        assert!(ActivationKind::LeakyReLU { alpha: 0.2 }.validate().is_ok());
        assert!(ActivationKind::LeakyReLU { alpha: 0.0 }.validate().is_err());
        assert!(ActivationKind::LeakyReLU { alpha: f64::NAN }.validate().is_err());
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let h = 1e-6;
        for kind in [ActivationKind::Sigmoid, ActivationKind::Tanh] {
            for &z in &[-2.0, -0.3, 0.4, 1.7] {
                let numeric = (kind.function(z + h) - kind.function(z - h)) / (2.0 * h);
                let analytic = kind.derivative_from_output(kind.function(z));
                assert!((numeric - analytic).abs() < 1e-6, "{kind} at {z}");
            }
        }
    }

    #[test]
    fn relu_kink_has_zero_subgradient() {
        let relu = ActivationKind::ReLU;
        assert_eq!(relu.derivative_from_output(relu.function(0.0)), 0.0);
        assert_eq!(relu.derivative_from_output(relu.function(2.0)), 1.0);
    }
}
