//! Predictor Network - forward pass
//!
//! `fc1 → ReLU → fc2 → ReLU → fc3 → ReLU → fc4 → sigmoid`.
//! Dropout exists only while training; inference never drops units, so the
//! same parameters and input always give the same bits.

use ndarray::{Array1, Array2, ArrayView1, Axis};

use super::params::{DenseLayer, NetworkParameters};
use crate::logic::error::PredictionError;
use crate::logic::features::FeatureVector;

/// Dropout probability after each hidden layer (training only)
pub const DROPOUT_RATES: [f32; 3] = [0.3, 0.3, 0.2];

#[derive(Debug, Clone, PartialEq)]
pub struct PredictorNetwork {
    params: NetworkParameters,
}

impl PredictorNetwork {
    pub fn new(params: NetworkParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &NetworkParameters {
        &self.params
    }

    pub fn input_size(&self) -> usize {
        self.params.input_size()
    }

    pub fn hidden_size(&self) -> usize {
        self.params.hidden_size()
    }

    /// Score a single vector, returns a value in [0, 1]
    pub fn forward(&self, features: &FeatureVector) -> Result<f32, PredictionError> {
        if features.len() != self.input_size() {
            return Err(PredictionError::DimensionMismatch {
                expected: self.input_size(),
                actual: features.len(),
            });
        }

        let x = ArrayView1::from(features.as_slice());
        let h1 = dense(&self.params.fc1, x).mapv_into(relu);
        let h2 = dense(&self.params.fc2, h1.view()).mapv_into(relu);
        let h3 = dense(&self.params.fc3, h2.view()).mapv_into(relu);
        let out = dense(&self.params.fc4, h3.view()).mapv_into(sigmoid);

        out.get(0)
            .copied()
            .filter(|p| p.is_finite())
            .ok_or(PredictionError::NonFiniteOutput)
    }
}

/// Inference-mode batch pass, rows of `inputs` are [n, input_size]
pub(crate) fn forward_batch(params: &NetworkParameters, inputs: &Array2<f32>) -> Array1<f32> {
    let h1 = dense_batch(&params.fc1, inputs).mapv_into(relu);
    let h2 = dense_batch(&params.fc2, &h1).mapv_into(relu);
    let h3 = dense_batch(&params.fc3, &h2).mapv_into(relu);
    dense_batch(&params.fc4, &h3)
        .mapv_into(sigmoid)
        .index_axis_move(Axis(1), 0)
}

fn dense(layer: &DenseLayer, x: ArrayView1<f32>) -> Array1<f32> {
    layer.weight.dot(&x) + &layer.bias
}

/// `inputs · Wᵀ + b` for a batch
pub(crate) fn dense_batch(layer: &DenseLayer, inputs: &Array2<f32>) -> Array2<f32> {
    inputs.dot(&layer.weight.t()) + &layer.bias
}

/// NaN passes through so a poisoned input cannot become a zero activation
pub(crate) fn relu(x: f32) -> f32 {
    if x > 0.0 || x.is_nan() {
        x
    } else {
        0.0
    }
}

pub(crate) fn sigmoid(x: f32) -> f32 {
    // Numerically-stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}
