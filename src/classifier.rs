use ndarray::{Array1, Array2};
use std::collections::BTreeMap;

/// Minimal capability a model must expose to take part in an evaluation:
/// a destructive `fit` and a mean-accuracy `score`. Calling `fit` again
/// retrains from scratch; no state survives across calls.
///
/// Labels are 0/1 on this boundary. Implementations that train on the
/// ±1 convention convert with [`to_signed`].
pub trait Classifier {
    fn fit(&mut self, features: &Array2<f64>, labels: &Array1<f64>);

    /// Predicted 0/1 labels, one per row of `features`.
    fn predict(&self, features: &Array2<f64>) -> Array1<f64>;

    /// Fraction of rows whose prediction matches `labels`.
    fn score(&self, features: &Array2<f64>, labels: &Array1<f64>) -> f64 {
        let predictions = self.predict(features);
        let correct = predictions
            .iter()
            .zip(labels.iter())
            .filter(|(prediction, label)| (**prediction - **label).abs() < f64::EPSILON)
            .count();

        correct as f64 / labels.len() as f64
    }
}

/// Named classifiers under evaluation. A `BTreeMap` keeps report ordering
/// stable across runs.
pub type Registry = BTreeMap<String, Box<dyn Classifier>>;

/// Maps 0/1 labels to the ±1 convention the linear models train on.
pub fn to_signed(labels: &Array1<f64>) -> Array1<f64> {
    labels.mapv(|label| if label > 0.5 { 1.0 } else { -1.0 })
}

/// Maps a ±1 decision value back to a 0/1 label.
pub fn to_binary(decision: f64) -> f64 {
    if decision >= 0.0 {
        1.0
    } else {
        0.0
    }
}
