//! Standard scaler fitting
//!
//! Mean and population standard deviation per column. A constant column
//! gets a scale of 1 so the transform stays defined.

use ndarray::{Array2, Axis};

use crate::logic::scaler::LinearTransform;

pub fn fit_standard_scaler(features: &Array2<f64>) -> LinearTransform {
    let n = features.nrows().max(1) as f64;
    let mut center = Vec::with_capacity(features.ncols());
    let mut scale = Vec::with_capacity(features.ncols());

    for column in features.axis_iter(Axis(1)) {
        let mean = column.sum() / n;
        let variance = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        center.push(mean);
        scale.push(if std > 0.0 && std.is_finite() { std } else { 1.0 });
    }

    LinearTransform { center, scale }
}

/// Apply `(x - center) / scale` column-wise
pub fn apply(transform: &LinearTransform, features: &Array2<f64>) -> Array2<f32> {
    let mut out = Array2::<f32>::zeros(features.raw_dim());
    for ((i, j), value) in features.indexed_iter() {
        out[[i, j]] = ((value - transform.center[j]) / transform.scale[j]) as f32;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_mean_and_population_std() {
        let x = array![[1.0, 5.0], [3.0, 5.0]];
        let t = fit_standard_scaler(&x);
        assert_eq!(t.center, vec![2.0, 5.0]);
        assert_eq!(t.scale, vec![1.0, 1.0]); // std 1, constant column → 1
    }

    #[test]
    fn test_apply_centers_data() {
        let x = array![[2.0, 10.0], [4.0, 20.0], [6.0, 30.0]];
        let t = fit_standard_scaler(&x);
        let scaled = apply(&t, &x);
        for col in scaled.axis_iter(Axis(1)) {
            assert!(col.sum().abs() < 1e-6);
        }
    }
}
