//! Network parameters and their tensor-map representation
//!
//! Topology: `fc1 [H, I] → fc2 [H, H] → fc3 [32, H] → fc4 [1, 32]`.
//! `I` and `H` come from the shape of `fc1.weight`; everything else is
//! checked against them.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::THIRD_LAYER_SIZE;
use crate::logic::error::StorageError;

/// Layer names in forward order
pub const LAYER_NAMES: [&str; 4] = ["fc1", "fc2", "fc3", "fc4"];

/// Row-major tensor as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    pub shape: Vec<usize>,
    /// Widened from f32 so that text round-trips are exact
    pub data: Vec<f64>,
}

impl Tensor {
    fn from_matrix(m: &Array2<f32>) -> Self {
        Self {
            shape: vec![m.nrows(), m.ncols()],
            data: m.iter().map(|v| f64::from(*v)).collect(),
        }
    }

    fn from_vector(v: &Array1<f32>) -> Self {
        Self {
            shape: vec![v.len()],
            data: v.iter().map(|v| f64::from(*v)).collect(),
        }
    }

    fn check(&self, name: &str, expected: &[usize]) -> Result<Vec<f32>, StorageError> {
        if self.shape != expected {
            return Err(StorageError::ShapeMismatch {
                name: name.to_string(),
                expected: expected.to_vec(),
                actual: self.shape.clone(),
            });
        }
        let len: usize = expected.iter().product();
        if self.data.len() != len {
            return Err(StorageError::DataLength {
                name: name.to_string(),
                expected: len,
                actual: self.data.len(),
            });
        }
        if self.data.iter().any(|v| !v.is_finite()) {
            return Err(StorageError::NonFinite(name.to_string()));
        }
        Ok(self.data.iter().map(|v| *v as f32).collect())
    }
}

/// One fully-connected layer
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    /// Shape: [out_dim, in_dim]
    pub weight: Array2<f32>,
    /// Shape: [out_dim]
    pub bias: Array1<f32>,
}

impl DenseLayer {
    pub fn in_dim(&self) -> usize {
        self.weight.ncols()
    }

    pub fn out_dim(&self) -> usize {
        self.weight.nrows()
    }

    /// Uniform init in `±1/sqrt(in_dim)` for weights and bias
    fn seeded(in_dim: usize, out_dim: usize, rng: &mut StdRng) -> Self {
        let bound = 1.0 / (in_dim as f32).sqrt();
        let weight = Array2::from_shape_fn((out_dim, in_dim), |_| rng.gen_range(-bound..bound));
        let bias = Array1::from_shape_fn(out_dim, |_| rng.gen_range(-bound..bound));
        Self { weight, bias }
    }

    fn from_tensors(
        name: &str,
        tensors: &BTreeMap<String, Tensor>,
        out_dim: usize,
        in_dim: usize,
    ) -> Result<Self, StorageError> {
        let weight_key = format!("{}.weight", name);
        let bias_key = format!("{}.bias", name);

        let weight = get(tensors, &weight_key)?.check(&weight_key, &[out_dim, in_dim])?;
        let bias = get(tensors, &bias_key)?.check(&bias_key, &[out_dim])?;

        let actual = weight.len();
        let weight = Array2::from_shape_vec((out_dim, in_dim), weight).map_err(|_| {
            StorageError::DataLength {
                name: weight_key.clone(),
                expected: out_dim * in_dim,
                actual,
            }
        })?;

        Ok(Self {
            weight,
            bias: Array1::from_vec(bias),
        })
    }
}

fn get<'a>(tensors: &'a BTreeMap<String, Tensor>, key: &str) -> Result<&'a Tensor, StorageError> {
    tensors
        .get(key)
        .ok_or_else(|| StorageError::MissingTensor(key.to_string()))
}

/// Weights and biases for all four layers
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkParameters {
    pub fc1: DenseLayer,
    pub fc2: DenseLayer,
    pub fc3: DenseLayer,
    pub fc4: DenseLayer,
}

impl NetworkParameters {
    /// Deterministic initialization: same seed, same parameters
    pub fn seeded(input_size: usize, hidden_size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            fc1: DenseLayer::seeded(input_size, hidden_size, &mut rng),
            fc2: DenseLayer::seeded(hidden_size, hidden_size, &mut rng),
            fc3: DenseLayer::seeded(hidden_size, THIRD_LAYER_SIZE, &mut rng),
            fc4: DenseLayer::seeded(THIRD_LAYER_SIZE, 1, &mut rng),
        }
    }

    pub fn input_size(&self) -> usize {
        self.fc1.in_dim()
    }

    pub fn hidden_size(&self) -> usize {
        self.fc1.out_dim()
    }

    pub fn layers(&self) -> [&DenseLayer; 4] {
        [&self.fc1, &self.fc2, &self.fc3, &self.fc4]
    }

    pub(crate) fn layers_mut(&mut self) -> [&mut DenseLayer; 4] {
        [&mut self.fc1, &mut self.fc2, &mut self.fc3, &mut self.fc4]
    }

    /// Same shapes, all zeros (gradient and optimizer buffers)
    pub(crate) fn zeros_like(&self) -> Self {
        let zero = |l: &DenseLayer| DenseLayer {
            weight: Array2::zeros(l.weight.raw_dim()),
            bias: Array1::zeros(l.bias.raw_dim()),
        };
        Self {
            fc1: zero(&self.fc1),
            fc2: zero(&self.fc2),
            fc3: zero(&self.fc3),
            fc4: zero(&self.fc4),
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.layers()
            .iter()
            .map(|l| l.weight.len() + l.bias.len())
            .sum()
    }

    /// Rebuild from a tensor map, inferring `I` and `H` from `fc1.weight`
    pub fn from_tensors(tensors: &BTreeMap<String, Tensor>) -> Result<Self, StorageError> {
        for key in tensors.keys() {
            let known = LAYER_NAMES
                .iter()
                .any(|l| *key == format!("{}.weight", l) || *key == format!("{}.bias", l));
            if !known {
                return Err(StorageError::UnexpectedTensor(key.clone()));
            }
        }

        let first = get(tensors, "fc1.weight")?;
        let (hidden_size, input_size) = match first.shape.as_slice() {
            [rows, cols] if *rows > 0 && *cols > 0 => (*rows, *cols),
            other => {
                return Err(StorageError::ShapeMismatch {
                    name: "fc1.weight".to_string(),
                    expected: vec![0, 0],
                    actual: other.to_vec(),
                })
            }
        };

        Ok(Self {
            fc1: DenseLayer::from_tensors("fc1", tensors, hidden_size, input_size)?,
            fc2: DenseLayer::from_tensors("fc2", tensors, hidden_size, hidden_size)?,
            fc3: DenseLayer::from_tensors("fc3", tensors, THIRD_LAYER_SIZE, hidden_size)?,
            fc4: DenseLayer::from_tensors("fc4", tensors, 1, THIRD_LAYER_SIZE)?,
        })
    }

    pub fn to_tensors(&self) -> BTreeMap<String, Tensor> {
        let mut tensors = BTreeMap::new();
        for (name, layer) in LAYER_NAMES.iter().zip(self.layers()) {
            tensors.insert(format!("{}.weight", name), Tensor::from_matrix(&layer.weight));
            tensors.insert(format!("{}.bias", name), Tensor::from_vector(&layer.bias));
        }
        tensors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_deterministic() {
        let a = NetworkParameters::seeded(4, 16, 42);
        let b = NetworkParameters::seeded(4, 16, 42);
        let c = NetworkParameters::seeded(4, 16, 7);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_shapes() {
        let params = NetworkParameters::seeded(4, 64, 42);
        assert_eq!(params.input_size(), 4);
        assert_eq!(params.hidden_size(), 64);
        assert_eq!(params.fc3.weight.dim(), (32, 64));
        assert_eq!(params.fc4.weight.dim(), (1, 32));
        assert_eq!(
            params.parameter_count(),
            4 * 64 + 64 + 64 * 64 + 64 + 64 * 32 + 32 + 32 + 1
        );
    }

    #[test]
    fn test_tensor_round_trip_is_exact() {
        let params = NetworkParameters::seeded(4, 8, 3);
        let rebuilt = NetworkParameters::from_tensors(&params.to_tensors()).unwrap();
        assert_eq!(params, rebuilt);
    }

    #[test]
    fn test_infers_dimensions_from_first_layer() {
        let params = NetworkParameters::seeded(7, 20, 1);
        let rebuilt = NetworkParameters::from_tensors(&params.to_tensors()).unwrap();
        assert_eq!(rebuilt.input_size(), 7);
        assert_eq!(rebuilt.hidden_size(), 20);
    }

    #[test]
    fn test_missing_tensor() {
        let mut tensors = NetworkParameters::seeded(4, 8, 3).to_tensors();
        tensors.remove("fc3.bias");
        assert!(matches!(
            NetworkParameters::from_tensors(&tensors),
            Err(StorageError::MissingTensor(ref k)) if k == "fc3.bias"
        ));
    }

    #[test]
    fn test_unexpected_tensor() {
        let mut tensors = NetworkParameters::seeded(4, 8, 3).to_tensors();
        tensors.insert(
            "fc5.weight".to_string(),
            Tensor { shape: vec![1], data: vec![0.0] },
        );
        assert!(matches!(
            NetworkParameters::from_tensors(&tensors),
            Err(StorageError::UnexpectedTensor(_))
        ));
    }

    #[test]
    fn test_inconsistent_hidden_size() {
        let mut tensors = NetworkParameters::seeded(4, 8, 3).to_tensors();
        let other = NetworkParameters::seeded(4, 16, 3).to_tensors();
        tensors.insert("fc2.weight".to_string(), other["fc2.weight"].clone());
        assert!(matches!(
            NetworkParameters::from_tensors(&tensors),
            Err(StorageError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_truncated_data() {
        let mut tensors = NetworkParameters::seeded(4, 8, 3).to_tensors();
        tensors.get_mut("fc1.weight").unwrap().data.pop();
        assert!(matches!(
            NetworkParameters::from_tensors(&tensors),
            Err(StorageError::DataLength { .. })
        ));
    }

    #[test]
    fn test_non_finite_values() {
        let mut tensors = NetworkParameters::seeded(4, 8, 3).to_tensors();
        tensors.get_mut("fc4.bias").unwrap().data[0] = f64::NAN;
        assert!(matches!(
            NetworkParameters::from_tensors(&tensors),
            Err(StorageError::NonFinite(_))
        ));
    }
}
