use ndarray::{Array1, Array2};

use crate::classifier::{to_binary, to_signed, Classifier};

#[derive(Debug, Clone, Copy)]
pub enum LossType {
    Logistic,
    Exponential,
    Hinge,
}

/// Linear model trained by full-batch gradient descent on one of three
/// margin losses, with an elastic-net penalty. Weights are reset to zero at
/// the start of every `fit`, so refitting never carries state over.
pub struct LinearClassifier {
    weights: Array1<f64>,
    learning_rate: f64,
    elastic_net_regularization: f64,
    loss_type: LossType,
    number_of_epochs: usize,
}

impl LinearClassifier {
    pub fn new(
        learning_rate: f64,
        elastic_net_regularization: f64,
        loss_type: LossType,
        number_of_epochs: usize,
    ) -> Self {
        Self {
            weights: Array1::zeros(0),
            learning_rate,
            elastic_net_regularization,
            loss_type,
            number_of_epochs,
        }
    }

    fn decision(&self, features: &Array2<f64>) -> Array1<f64> {
        features.dot(&self.weights)
    }

    fn step(&mut self, features: &Array2<f64>, signed_labels: &Array1<f64>) {
        let mut gradient = self.compute_loss_gradient(features, signed_labels);

        gradient += &self.elastic_net_regularization_gradient();

        self.weights = &self.weights - self.learning_rate * gradient;
    }

    fn elastic_net_regularization_gradient(&self) -> Array1<f64> {
        let l1_term = self.weights.mapv(f64::signum);
        let l2_term = self.weights.clone();

        self.elastic_net_regularization * (l1_term + 2.0 * l2_term)
    }

    fn compute_loss_gradient(
        &self,
        features: &Array2<f64>,
        signed_labels: &Array1<f64>,
    ) -> Array1<f64> {
        let n_samples = features.nrows() as f64;
        let mut gradient = Array1::zeros(features.ncols());

        for (sample, &label) in features.rows().into_iter().zip(signed_labels.iter()) {
            let margin = label * sample.dot(&self.weights);

            let weight = match self.loss_type {
                // d/dw ln(1 + e^{-m}) = -y x sigmoid(-m)
                LossType::Logistic => -label / (1.0 + margin.exp()),
                // d/dw e^{-m} = -y x e^{-m}
                LossType::Exponential => -label * (-margin).exp(),
                // subgradient of max(0, 1 - m)
                LossType::Hinge => {
                    if margin < 1.0 {
                        -label
                    } else {
                        0.0
                    }
                }
            };

            gradient.zip_mut_with(&sample, |current_gradient, &feature_value| {
                *current_gradient += weight * feature_value;
            });
        }

        gradient / n_samples
    }
}

impl Classifier for LinearClassifier {
    fn fit(&mut self, features: &Array2<f64>, labels: &Array1<f64>) {
        self.weights = Array1::zeros(features.ncols());
        let signed_labels = to_signed(labels);

        for _ in 0..self.number_of_epochs {
            self.step(features, &signed_labels);
        }
    }

    fn predict(&self, features: &Array2<f64>) -> Array1<f64> {
        self.decision(features).mapv(to_binary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    fn separable_clusters() -> (Array2<f64>, Array1<f64>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let jitter = f64::from(i % 5) * 0.1;
            rows.push([2.0 + jitter, 2.0 - jitter]);
            labels.push(1.0);
            rows.push([-2.0 - jitter, -2.0 + jitter]);
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
    fn separates_two_clusters_with_each_loss() {
        let (features, labels) = separable_clusters();

        for loss_type in [LossType::Logistic, LossType::Exponential, LossType::Hinge] {
            let mut model = LinearClassifier::new(0.05, 0.001, loss_type, 500);
            model.fit(&features, &labels);

            let accuracy = model.score(&features, &labels);
            assert!(accuracy > 0.95, "{loss_type:?} accuracy was {accuracy}");
        }
    }

    #[test]
    fn refit_retrains_from_scratch() {
        let (features, labels) = separable_clusters();
        let flipped = labels.mapv(|label| 1.0 - label);

        let mut model = LinearClassifier::new(0.05, 0.001, LossType::Logistic, 500);
        model.fit(&features, &labels);
        model.fit(&features, &flipped);

        assert!(model.score(&features, &flipped) > 0.95);
    }

    #[test]
    fn predicts_binary_labels() {
        let (features, labels) = separable_clusters();
        let mut model = LinearClassifier::new(0.05, 0.001, LossType::Hinge, 200);
        model.fit(&features, &labels);

        let predictions = model.predict(&array![[3.0, 3.0], [-3.0, -3.0]]);
        assert!(predictions.iter().all(|&p| p == 0.0 || p == 1.0));
    }
}
