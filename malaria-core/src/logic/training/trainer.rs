//! Full-batch trainer for the predictor network
//!
//! MSE loss, Adam, dropout on the three hidden layers while training,
//! early stopping on validation loss. Everything random (init, split,
//! dropout masks) derives from one seed.

use anyhow::Result;
use ndarray::{Array, Array1, Array2, Axis, Dimension, Zip};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::dataset::Dataset;
use super::standardize::{apply, fit_standard_scaler};
use crate::constants::{DEFAULT_SEED, DEFAULT_TRAIN_HIDDEN_SIZE};
use crate::logic::features::FEATURE_LAYOUT;
use crate::logic::model::network::{dense_batch, forward_batch, relu, sigmoid};
use crate::logic::model::{NetworkParameters, DROPOUT_RATES};
use crate::logic::scaler::ScalerArtifact;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub hidden_size: usize,
    pub epochs: usize,
    pub patience: usize,
    pub learning_rate: f32,
    pub val_fraction: f64,
    pub seed: u64,
    /// Improvement below this does not reset patience
    pub min_delta: f32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            hidden_size: DEFAULT_TRAIN_HIDDEN_SIZE,
            epochs: 1000,
            patience: 100,
            learning_rate: 0.01,
            val_fraction: 0.2,
            seed: DEFAULT_SEED,
            min_delta: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub samples: usize,
    pub train_samples: usize,
    pub val_samples: usize,
    pub epochs_run: usize,
    pub best_epoch: usize,
    pub best_val_loss: f32,
    /// Over the full dataset, in percentage points squared
    pub mse_pct: f64,
    pub r2: f64,
    pub max_cases: f64,
}

/// Everything the training job persists
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub params: NetworkParameters,
    pub scaler: ScalerArtifact,
    pub report: TrainingReport,
}

/// Activations kept from a training forward pass
struct ForwardCache {
    pre: Vec<Array2<f32>>,
    post: Vec<Array2<f32>>,
    masks: Vec<Array2<f32>>,
    out: Array1<f32>,
}

struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    step: i32,
    m: NetworkParameters,
    v: NetworkParameters,
}

impl Adam {
    fn new(params: &NetworkParameters, lr: f32) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            step: 0,
            m: params.zeros_like(),
            v: params.zeros_like(),
        }
    }

    fn update(&mut self, params: &mut NetworkParameters, grads: &NetworkParameters) {
        self.step += 1;
        let bc1 = 1.0 - self.beta1.powi(self.step);
        let bc2 = 1.0 - self.beta2.powi(self.step);
        let hp = (self.lr, self.beta1, self.beta2, self.eps, bc1, bc2);

        let layers = params.layers_mut().into_iter();
        let ms = self.m.layers_mut().into_iter();
        let vs = self.v.layers_mut().into_iter();
        for (((p, m), v), g) in layers.zip(ms).zip(vs).zip(grads.layers()) {
            adam_step(&mut p.weight, &mut m.weight, &mut v.weight, &g.weight, hp);
            adam_step(&mut p.bias, &mut m.bias, &mut v.bias, &g.bias, hp);
        }
    }
}

fn adam_step<D: Dimension>(
    p: &mut Array<f32, D>,
    m: &mut Array<f32, D>,
    v: &mut Array<f32, D>,
    g: &Array<f32, D>,
    (lr, beta1, beta2, eps, bc1, bc2): (f32, f32, f32, f32, f32, f32),
) {
    Zip::from(p).and(m).and(v).and(g).for_each(|p, m, v, &g| {
        *m = beta1 * *m + (1.0 - beta1) * g;
        *v = beta2 * *v + (1.0 - beta2) * g * g;
        let m_hat = *m / bc1;
        let v_hat = *v / bc2;
        *p -= lr * m_hat / (v_hat.sqrt() + eps);
    });
}

pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn fit(&self, dataset: &Dataset) -> Result<TrainedModel> {
        let n = dataset.len();
        if n < 2 {
            anyhow::bail!("Need at least 2 rows to train, got {}", n);
        }
        if self.config.hidden_size == 0 {
            anyhow::bail!("hidden_size must be > 0");
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let transform = fit_standard_scaler(&dataset.features);
        let x_all = apply(&transform, &dataset.features);
        let y_all = dataset.targets.mapv(|v| v as f32);

        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);
        let n_val = ((n as f64) * self.config.val_fraction).ceil() as usize;
        let n_val = n_val.clamp(1, n - 1);
        let (val_idx, train_idx) = indices.split_at(n_val);

        let x_train = x_all.select(Axis(0), train_idx);
        let y_train = y_all.select(Axis(0), train_idx);
        let x_val = x_all.select(Axis(0), val_idx);
        let y_val = y_all.select(Axis(0), val_idx);

        log::info!(
            "Training on {} rows ({} train / {} val), hidden={}",
            n,
            train_idx.len(),
            val_idx.len(),
            self.config.hidden_size
        );

        let mut params =
            NetworkParameters::seeded(FEATURE_LAYOUT.len(), self.config.hidden_size, rng.gen());
        let mut optimizer = Adam::new(&params, self.config.learning_rate);

        let mut best = params.clone();
        let mut best_val = f32::INFINITY;
        let mut best_epoch = 0;
        let mut wait = 0;
        let mut epochs_run = 0;

        for epoch in 1..=self.config.epochs {
            epochs_run = epoch;

            let cache = forward_train(&params, &x_train, &mut rng);
            let train_loss = mse(&cache.out, &y_train);
            let grads = backward(&params, &x_train, &y_train, &cache);
            optimizer.update(&mut params, &grads);

            let val_loss = mse(&forward_batch(&params, &x_val), &y_val);

            if epoch % 100 == 0 || epoch == 1 {
                log::info!(
                    "Epoch {}/{} train_loss={:.6} val_loss={:.6}",
                    epoch,
                    self.config.epochs,
                    train_loss,
                    val_loss
                );
            }

            if val_loss < best_val - self.config.min_delta {
                best_val = val_loss;
                best_epoch = epoch;
                best = params.clone();
                wait = 0;
            } else {
                wait += 1;
                if wait >= self.config.patience {
                    log::info!("Early stopping at epoch {}", epoch);
                    break;
                }
            }
        }

        let predictions = forward_batch(&best, &x_all);
        let (mse_pct, r2) = evaluate_pct(&predictions, &y_all);

        let report = TrainingReport {
            samples: n,
            train_samples: train_idx.len(),
            val_samples: val_idx.len(),
            epochs_run,
            best_epoch,
            best_val_loss: best_val,
            mse_pct,
            r2,
            max_cases: dataset.max_cases,
        };

        let scaler = ScalerArtifact::new(
            FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            Some(transform),
            Some(dataset.max_cases),
        );

        Ok(TrainedModel {
            params: best,
            scaler,
            report,
        })
    }
}

/// Training-mode forward pass: ReLU then inverted dropout on hidden layers
fn forward_train(params: &NetworkParameters, x: &Array2<f32>, rng: &mut StdRng) -> ForwardCache {
    let layers = params.layers();
    let mut pre = Vec::with_capacity(3);
    let mut post = Vec::with_capacity(3);
    let mut masks = Vec::with_capacity(3);

    let mut input = x.clone();
    for (layer, &rate) in layers.iter().take(3).zip(DROPOUT_RATES.iter()) {
        let z = dense_batch(layer, &input);
        let keep = 1.0 / (1.0 - rate);
        let mask = Array2::from_shape_fn(z.raw_dim(), |_| {
            if rng.gen::<f32>() < rate { 0.0 } else { keep }
        });
        let a = z.mapv(relu) * &mask;

        input = a.clone();
        pre.push(z);
        post.push(a);
        masks.push(mask);
    }

    let out = dense_batch(layers[3], &input)
        .mapv_into(sigmoid)
        .index_axis_move(Axis(1), 0);

    ForwardCache { pre, post, masks, out }
}

/// Gradients of mean squared error w.r.t. every parameter
fn backward(
    params: &NetworkParameters,
    x: &Array2<f32>,
    y: &Array1<f32>,
    cache: &ForwardCache,
) -> NetworkParameters {
    let n = y.len() as f32;
    let layers = params.layers();
    let mut grads = params.zeros_like();
    let mut slots = grads.layers_mut();

    // d(loss)/d(logit) through the sigmoid
    let out = &cache.out;
    let d_out = (out - y).mapv(|d| 2.0 * d / n) * &out.mapv(|o| o * (1.0 - o));
    let mut delta = d_out.insert_axis(Axis(1)); // [n, 1]

    slots[3].weight = delta.t().dot(&cache.post[2]);
    slots[3].bias = delta.sum_axis(Axis(0));
    let mut upstream = delta.dot(&layers[3].weight);

    for k in (0..3).rev() {
        let relu_grad = cache.pre[k].mapv(|z| if z > 0.0 { 1.0 } else { 0.0 });
        delta = upstream * &cache.masks[k] * &relu_grad;

        let inputs = if k == 0 { x } else { &cache.post[k - 1] };
        slots[k].weight = delta.t().dot(inputs);
        slots[k].bias = delta.sum_axis(Axis(0));
        upstream = delta.dot(&layers[k].weight);
    }

    grads
}

fn mse(pred: &Array1<f32>, target: &Array1<f32>) -> f32 {
    let n = pred.len().max(1) as f32;
    (pred - target).mapv(|d| d * d).sum() / n
}

/// MSE and R² on the percentage scale
fn evaluate_pct(pred: &Array1<f32>, target: &Array1<f32>) -> (f64, f64) {
    let n = pred.len().max(1) as f64;
    let p: Vec<f64> = pred.iter().map(|v| f64::from(*v) * 100.0).collect();
    let t: Vec<f64> = target.iter().map(|v| f64::from(*v) * 100.0).collect();

    let ss_res: f64 = p.iter().zip(&t).map(|(a, b)| (a - b).powi(2)).sum();
    let mean_t = t.iter().sum::<f64>() / n;
    let ss_tot: f64 = t.iter().map(|b| (b - mean_t).powi(2)).sum();

    let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };
    (ss_res / n, r2)
}
