// Forward outputs and parameter gradients checked against values from a
// reverse-mode autodiff reference run on the same fixed weights.

use approx::assert_abs_diff_eq;

use layerwise_nn::{Activation, ActivationKind, FullyConnected, Layer, Matrix, MseLoss, Network, NnError};

const TOL: f64 = 1e-5;

fn m(rows: &[&[f64]]) -> Matrix {
    Matrix::from_data(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
}

fn assert_close(actual: &Matrix, expected: &Matrix) {
    assert_eq!(actual.shape(), expected.shape());
    for (row_a, row_e) in actual.data.iter().zip(expected.data.iter()) {
        for (a, e) in row_a.iter().zip(row_e.iter()) {
            assert_abs_diff_eq!(*a, *e, epsilon = TOL);
        }
    }
}

fn fc(weights: &[&[f64]], biases: &[f64]) -> FullyConnected {
    FullyConnected::from_parameters(m(weights), Matrix::column(biases)).unwrap()
}

// ============================================================================
// Fully-connected layer followed by MSE
// ============================================================================

#[test]
fn fully_connected_with_mse_matches_reference() {
    let mut layer = fc(
        &[
            &[0.2, -0.5, 0.1, 0.7],
            &[-0.3, 0.8, -0.6, 0.05],
            &[0.4, 0.1, -0.2, -0.9],
        ],
        &[0.1, -0.2, 0.05],
    );
    let x = m(&[&[0.5, -1.0], &[1.5, 0.3], &[-0.7, 0.8], &[0.2, -0.4]]);
    let y = m(&[&[0.3, -0.1], &[0.9, 0.4], &[-0.5, 0.2]]);

    let z = layer.forward(&x).unwrap();
    assert_close(&z, &m(&[&[-0.48, -0.45], &[1.28, -0.16], &[0.36, -0.12]]));

    let mut mse = MseLoss::new();
    let loss = mse.forward(&z, &y).unwrap();
    assert_abs_diff_eq!(loss, 0.3384833333333333, epsilon = TOL);

    let dx = layer.backward(&mse.backward().unwrap()).unwrap();

    assert_close(
        &layer.weights_grad(),
        &m(&[
            &[-0.013333333333, -0.425, 0.088666666667, -0.005333333333],
            &[0.25, 0.134, -0.238, 0.1],
            &[0.25, 0.398, -0.286, 0.1],
        ]),
    );
    assert_close(&layer.biases_grad(), &Matrix::column(&[-0.376666666667, -0.06, 0.18]));
    assert_close(
        &dx,
        &m(&[
            &[0.024666666667, -0.01],
            &[0.26, -0.101666666667],
            &[-0.159333333333, 0.121666666667],
            &[-0.433666666667, 0.005],
        ]),
    );
}

// ============================================================================
// ReLU
// ============================================================================

#[test]
fn relu_matches_reference() {
    let mut relu = Activation::new(ActivationKind::ReLU, 2).unwrap();
    let z = m(&[&[0.5, -1.2, 0.0], &[-0.3, 2.0, 0.7]]);
    let a = relu.forward(&z).unwrap();
    assert_close(&a, &m(&[&[0.5, 0.0, 0.0], &[0.0, 2.0, 0.7]]));

    let upstream = m(&[&[1.5, -2.0, 0.25], &[3.0, 0.5, -1.0]]);
    let dz = relu.backward(&upstream).unwrap();
    assert_close(&dz, &m(&[&[1.5, 0.0, 0.0], &[0.0, 0.5, -1.0]]));
}

// ============================================================================
// fc(3→4) + relu + fc(4→2) + relu, MSE
// ============================================================================

fn two_layer_relu_net() -> Network {
    let mut net = Network::new(3).unwrap();
    net.add_layer(fc(
        &[
            &[0.3, -0.2, 0.5],
            &[-0.4, 0.6, 0.1],
            &[0.2, 0.2, -0.3],
            &[0.7, -0.1, 0.4],
        ],
        &[0.05, -0.1, 0.2, 0.0],
    ))
    .unwrap()
    .add_relu_layer()
    .unwrap()
    .add_layer(fc(
        &[&[0.5, -0.3, 0.8, 0.1], &[-0.6, 0.4, 0.2, 0.9]],
        &[0.1, 0.3],
    ))
    .unwrap()
    .add_relu_layer()
    .unwrap();
    net
}

fn fc_at(net: &Network, index: usize) -> &FullyConnected {
    match &net.layers()[index] {
        Layer::FullyConnected(fc) => fc,
        other => panic!("layer {index} is {}", other.kind_name()),
    }
}

#[test]
fn multi_layer_network_matches_reference() {
    let mut net = two_layer_relu_net();
    let x = m(&[&[0.9, -0.4, 0.3], &[0.1, 0.8, -0.6], &[-0.5, 0.2, 1.1]]);
    let y = m(&[&[0.4, 0.0, 0.7], &[0.2, 0.5, -0.1]]);

    let out = net.forward_pass(&x).unwrap();
    assert_close(&out, &m(&[&[0.607, 0.108, 0.576], &[0.758, 0.568, 0.453]]));

    let mut mse = MseLoss::new();
    assert_abs_diff_eq!(mse.forward(&out, &y).unwrap(), 0.115281, epsilon = TOL);
    net.backward_pass(&mse.backward().unwrap()).unwrap();

    let first = fc_at(&net, 0);
    assert_close(
        &first.weights_grad(),
        &m(&[
            &[-0.10877, 0.07105, -0.105843333333],
            &[0.000693333333, -0.001386666667, -0.000346666667],
            &[0.069826666667, 0.035906666667, -0.039533333333],
            &[0.2054, -0.07963, 0.090793333333],
        ]),
    );
    assert_close(
        &first.biases_grad(),
        &Matrix::column(&[-0.208366666667, -0.001733333333, 0.125733333333, 0.336066666667]),
    );

    let second = fc_at(&net, 2);
    assert_close(
        &second.weights_grad(),
        &m(&[
            &[-0.03003, 0.02016, 0.04587, -0.000366666667],
            &[0.15861, 0.012693333333, 0.107286666667, 0.208996666667],
        ]),
    );
    assert_close(&second.biases_grad(), &Matrix::column(&[0.063666666667, 0.393]));
}

// ============================================================================
// Gradient reset between mini-batches
// ============================================================================

#[test]
fn reset_clears_gradients_and_next_pass_starts_fresh() {
    let x = m(&[&[0.9, -0.4, 0.3], &[0.1, 0.8, -0.6], &[-0.5, 0.2, 1.1]]);
    let y = m(&[&[0.4, 0.0, 0.7], &[0.2, 0.5, -0.1]]);
    let mut mse = MseLoss::new();

    let mut net = two_layer_relu_net();
    let out = net.forward_pass(&x).unwrap();
    mse.forward(&out, &y).unwrap();
    net.backward_pass(&mse.backward().unwrap()).unwrap();
    net.update_parameters(0.1, true).unwrap();

    for layer in net.layers() {
        if let Layer::FullyConnected(fc) = layer {
            assert!(fc.weights_grad().data.iter().flatten().all(|&g| g == 0.0));
            assert!(fc.biases_grad().data.iter().flatten().all(|&g| g == 0.0));
        }
    }

    // A fresh network holding the updated weights must produce the same
    // gradients as the reset one: nothing leaks from the first batch.
    let mut fresh = Network::from_snapshot(net.snapshot()).unwrap();
    for n in [&mut net, &mut fresh] {
        let out = n.forward_pass(&x).unwrap();
        mse.forward(&out, &y).unwrap();
        n.backward_pass(&mse.backward().unwrap()).unwrap();
    }
    for (a, b) in net.layers().iter().zip(fresh.layers().iter()) {
        if let (Layer::FullyConnected(a), Layer::FullyConnected(b)) = (a, b) {
            assert_eq!(a.weights_grad(), b.weights_grad());
            assert_eq!(a.biases_grad(), b.biases_grad());
        }
    }
}

// ============================================================================
// Shape errors
// ============================================================================

#[test]
fn mse_shape_mismatch_does_not_touch_cache() {
    let mut mse = MseLoss::new();
    let err = mse.forward(&Matrix::zeros(3, 5), &Matrix::zeros(2, 5)).unwrap_err();
    assert!(matches!(err, NnError::ShapeMismatch { .. }));
    assert!(mse.cached().is_none());
    assert!(matches!(mse.backward(), Err(NnError::State(_))));
}
