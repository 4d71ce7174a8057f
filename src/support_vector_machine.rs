use ndarray::{Array1, Array2};

use crate::classifier::{to_binary, to_signed, Classifier};

/// Soft-margin linear support vector machine trained with a simplified SMO
/// loop. Because the kernel is linear, the weight vector is maintained
/// incrementally instead of summing over support vectors at prediction time.
pub struct LinearSvm {
    regularization: f64,
    error_tolerance: f64,
    max_iterations: usize,
    weights: Array1<f64>,
    bias: f64,
}

impl LinearSvm {
    pub fn new(regularization: f64, error_tolerance: f64, max_iterations: usize) -> Self {
        Self {
            regularization,
            error_tolerance,
            max_iterations,
            weights: Array1::zeros(0),
            bias: 0.0,
        }
    }

    fn decision(&self, sample: ndarray::ArrayView1<f64>) -> f64 {
        sample.dot(&self.weights) + self.bias
    }

    /// Attempts one SMO pair update; returns whether the alphas moved.
    #[allow(clippy::similar_names)]
    fn update_pair(
        &mut self,
        features: &Array2<f64>,
        labels: &Array1<f64>,
        alphas: &mut Array1<f64>,
        i: usize,
        j: usize,
        error_i: f64,
    ) -> bool {
        let error_j = self.decision(features.row(j)) - labels[j];

        let prev_alpha_i = alphas[i];
        let prev_alpha_j = alphas[j];

        let (low, high) = if (labels[i] - labels[j]).abs() > f64::EPSILON {
            (
                f64::max(0.0, alphas[j] - alphas[i]),
                f64::min(
                    self.regularization,
                    self.regularization + alphas[j] - alphas[i],
                ),
            )
        } else {
            (
                f64::max(0.0, alphas[i] + alphas[j] - self.regularization),
                f64::min(self.regularization, alphas[i] + alphas[j]),
            )
        };

        if low >= high {
            return false;
        }

        let k_ii = features.row(i).dot(&features.row(i));
        let k_jj = features.row(j).dot(&features.row(j));
        let k_ij = features.row(i).dot(&features.row(j));

        let eta = 2.0 * k_ij - k_ii - k_jj;
        if eta >= 0.0 {
            return false;
        }

        alphas[j] -= labels[j] * (error_i - error_j) / eta;
        alphas[j] = alphas[j].clamp(low, high);

        if (alphas[j] - prev_alpha_j).abs() < 1e-5 {
            return false;
        }

        alphas[i] += labels[i] * labels[j] * (prev_alpha_j - alphas[j]);

        let delta_i = labels[i] * (alphas[i] - prev_alpha_i);
        let delta_j = labels[j] * (alphas[j] - prev_alpha_j);

        let first_bias_candidate = self.bias - error_i - delta_i * k_ii - delta_j * k_ij;
        let second_bias_candidate = self.bias - error_j - delta_i * k_ij - delta_j * k_jj;

        if 0.0 < alphas[i] && alphas[i] < self.regularization {
            self.bias = first_bias_candidate;
        } else if 0.0 < alphas[j] && alphas[j] < self.regularization {
            self.bias = second_bias_candidate;
        } else {
            self.bias = (first_bias_candidate + second_bias_candidate) / 2.0;
        }

        // Linear kernel: fold the alpha movement straight into the weights.
        self.weights = &self.weights
            + delta_i * &features.row(i).to_owned()
            + delta_j * &features.row(j).to_owned();

        true
    }
}

impl Classifier for LinearSvm {
    fn fit(&mut self, features: &Array2<f64>, labels: &Array1<f64>) {
        let n_samples = features.nrows();
        let signed_labels = to_signed(labels);

        self.weights = Array1::zeros(features.ncols());
        self.bias = 0.0;
        let mut alphas: Array1<f64> = Array1::zeros(n_samples);

        let mut quiet_passes = 0;
        while quiet_passes < self.max_iterations {
            let mut pairs_changed = 0;

            for i in 0..n_samples {
                let error_i = self.decision(features.row(i)) - signed_labels[i];

                let violates_kkt = (signed_labels[i] * error_i < -self.error_tolerance
                    && alphas[i] < self.regularization)
                    || (signed_labels[i] * error_i > self.error_tolerance && alphas[i] > 0.0);

                if violates_kkt {
                    let j = (i + 1) % n_samples;
                    if self.update_pair(features, &signed_labels, &mut alphas, i, j, error_i) {
                        pairs_changed += 1;
                    }
                }
            }

            if pairs_changed == 0 {
                quiet_passes += 1;
            } else {
                quiet_passes = 0;
            }
        }
    }

    fn predict(&self, features: &Array2<f64>) -> Array1<f64> {
        Array1::from_iter(
            features
                .rows()
                .into_iter()
                .map(|sample| to_binary(self.decision(sample))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    fn separable_clusters() -> (Array2<f64>, Array1<f64>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..15 {
            let jitter = f64::from(i % 3) * 0.2;
            rows.push([2.5 + jitter, 2.0 - jitter]);
            labels.push(1.0);
            rows.push([-2.0 + jitter, -2.5 - jitter]);
            labels.push(0.0);
        }

        let features = Array2::from_shape_vec(
            (rows.len(), 2),
            rows.iter().flat_map(|row| row.to_vec()).collect(),
        )
        .unwrap();

        (features, Array1::from_vec(labels))
    }

    #[test]
    fn separates_two_clusters() {
        let (features, labels) = separable_clusters();

        let mut model = LinearSvm::new(1.0, 1e-3, 5);
        model.fit(&features, &labels);

        assert!(model.score(&features, &labels) > 0.9);
    }

    #[test]
    fn refit_resets_learned_state() {
        let (features, labels) = separable_clusters();
        let flipped = labels.mapv(|label| 1.0 - label);

        let mut model = LinearSvm::new(1.0, 1e-3, 5);
        model.fit(&features, &labels);
        model.fit(&features, &flipped);

        assert!(model.score(&features, &flipped) > 0.9);
    }

    #[test]
    fn predicts_fresh_points_by_side_of_the_margin() {
        let (features, labels) = separable_clusters();

        let mut model = LinearSvm::new(1.0, 1e-3, 5);
        model.fit(&features, &labels);

        let predictions = model.predict(&array![[3.0, 3.0], [-3.0, -3.0]]);
        assert_eq!(predictions, array![1.0, 0.0]);
    }
}
