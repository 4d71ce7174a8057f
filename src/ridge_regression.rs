use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

use crate::classifier::{to_binary, to_signed, Classifier};

/// Ridge regression on ±1 targets used as a classifier: the closed-form
/// normal equations with an unpenalized bias column, thresholded at zero for
/// prediction. If the regularized covariance is singular the weights stay at
/// zero and every prediction falls on the positive side of the threshold.
pub struct RidgeClassifier {
    weights: Array1<f64>,
    regularization: f64,
}

impl RidgeClassifier {
    pub fn new(regularization: f64) -> Self {
        Self {
            weights: Array1::zeros(0),
            regularization,
        }
    }

    fn with_bias(features: &Array2<f64>) -> Array2<f64> {
        let mut extended = Array2::ones((features.nrows(), features.ncols() + 1));
        extended
            .slice_mut(ndarray::s![.., 1..])
            .assign(features);
        extended
    }
}

impl Classifier for RidgeClassifier {
    fn fit(&mut self, features: &Array2<f64>, labels: &Array1<f64>) {
        let extended = Self::with_bias(features);
        let dimension = extended.ncols();
        let targets = to_signed(labels);

        self.weights = Array1::zeros(dimension);

        // (tau * I), bias left unpenalized
        let mut regularization: Array2<f64> = Array2::eye(dimension) * self.regularization;
        regularization[(0, 0)] = 0.0;

        // X^T * X + tau * I
        let covariance = extended.t().dot(&extended) + regularization;
        let covariance =
            DMatrix::from_row_iterator(dimension, dimension, covariance.iter().copied());

        if let Some(covariance_inverse) = covariance.try_inverse() {
            // X^T * y
            let features_targets_product = extended.t().dot(&targets);
            let features_targets_product = DMatrix::from_column_slice(
                dimension,
                1,
                features_targets_product
                    .as_slice()
                    .expect("freshly built vector is contiguous"),
            );

            // (X^T * X + tau * I)^-1 * (X^T * y)
            let weights = covariance_inverse * features_targets_product;

            self.weights = Array1::from_iter(weights.column(0).iter().copied());
        }
    }

    fn predict(&self, features: &Array2<f64>) -> Array1<f64> {
        Self::with_bias(features)
            .dot(&self.weights)
            .mapv(to_binary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn fits_an_axis_aligned_boundary() {
        let features = array![
            [1.0, 0.2],
            [1.5, -0.1],
            [2.0, 0.3],
            [-1.0, 0.1],
            [-1.5, -0.2],
            [-2.0, 0.2]
        ];
        let labels = array![1.0, 1.0, 1.0, 0.0, 0.0, 0.0];

        let mut model = RidgeClassifier::new(0.1);
        model.fit(&features, &labels);

        #[allow(clippy::float_cmp)]
        {
            assert_eq!(model.score(&features, &labels), 1.0);
        }
    }

    #[test]
    fn bias_handles_shifted_classes() {
        // Both clusters sit on the positive axis; only the bias separates them.
        let features = array![[4.0], [5.0], [6.0], [1.0], [1.5], [2.0]];
        let labels = array![1.0, 1.0, 1.0, 0.0, 0.0, 0.0];

        let mut model = RidgeClassifier::new(0.01);
        model.fit(&features, &labels);

        #[allow(clippy::float_cmp)]
        {
            assert_eq!(model.score(&features, &labels), 1.0);
        }
    }
}
