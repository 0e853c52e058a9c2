use rand::Rng;
use tracing::debug;

use crate::data::{one_hot, Sample};
use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Side of the square plane the clusters live in. Coordinates are divided by
/// this before they reach the network.
pub const PLANE_SIZE: f64 = 500.0;

/// Standard deviation of every blob, in plane units.
pub const CLUSTER_SPREAD: f64 = 40.0;

/// (x, y, name) of each cluster centre.
pub const CENTRES: [(f64, f64, &str); 3] = [
    (120.0, 120.0, "red"),
    (380.0, 150.0, "green"),
    (250.0, 390.0, "blue"),
];

/// Synthetic 3-class 2-D dataset.
#[derive(Debug, Clone)]
pub struct ClusterData {
    pub training: Vec<Sample>,
    pub test: Vec<Sample>,
    /// Class names, indexed by the label's hot position.
    pub choices: Vec<String>,
}

/// Draws `n_train` + `n_test` points from three Gaussian blobs.
///
/// Classes are assigned round-robin so both sets stay balanced.
pub fn generate<R: Rng + ?Sized>(n_train: usize, n_test: usize, rng: &mut R) -> Result<ClusterData> {
    if n_train == 0 {
        return Err(NnError::Configuration("cluster dataset needs at least one training point".into()));
    }
    let training = draw(n_train, rng)?;
    let test = draw(n_test, rng)?;
    debug!(n_train, n_test, "generated cluster dataset");
    Ok(ClusterData {
        training,
        test,
        choices: CENTRES.iter().map(|&(_, _, name)| name.to_string()).collect(),
    })
}

/// Scales a point in plane coordinates into a 2×1 network input.
pub fn scale_point(x: f64, y: f64) -> Matrix {
    Matrix::column(&[x / PLANE_SIZE, y / PLANE_SIZE])
}

fn draw<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Vec<Sample>> {
    (0..n)
        .map(|i| {
            let class = i % CENTRES.len();
            let (cx, cy, _) = CENTRES[class];
            let x = (cx + Matrix::sample_standard_normal(rng) * CLUSTER_SPREAD).clamp(0.0, PLANE_SIZE);
            let y = (cy + Matrix::sample_standard_normal(rng) * CLUSTER_SPREAD).clamp(0.0, PLANE_SIZE);
            Sample::new(scale_point(x, y), one_hot(class, CENTRES.len())?)
        })
        .collect()
}
