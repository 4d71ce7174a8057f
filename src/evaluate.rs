use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

use crate::classifier::Registry;
use crate::error::{AnalysisError, Result};

/// Accuracy per classifier name, one evaluation's worth.
pub type ScoreTable = BTreeMap<String, f64>;

/// Accuracy curves per classifier name, aligned to the sweep's proportions.
pub type ScoreCurves = BTreeMap<String, Vec<(f64, f64)>>;

#[derive(Debug)]
pub struct Split {
    pub train_features: Array2<f64>,
    pub train_labels: Array1<f64>,
    pub test_features: Array2<f64>,
    pub test_labels: Array1<f64>,
}

fn has_single_class(labels: &Array1<f64>) -> bool {
    labels
        .first()
        .is_some_and(|&first| labels.iter().all(|&label| (label - first).abs() < f64::EPSILON))
}

/// Partitions `(features, labels)` by a seeded uniform row permutation.
/// `round(n * test_proportion)` rows land in the test partition; there is no
/// stratification, so class balance is only preserved incidentally.
pub fn train_test_split(
    features: &Array2<f64>,
    labels: &Array1<f64>,
    test_proportion: f64,
    seed: u64,
) -> Result<Split> {
    if !(test_proportion > 0.0 && test_proportion < 1.0) {
        return Err(AnalysisError::invalid_parameter(
            "test_proportion",
            format!("{test_proportion} is outside (0, 1)"),
        ));
    }

    let n_samples = features.nrows();
    if labels.len() != n_samples {
        return Err(AnalysisError::DataFormat(format!(
            "{n_samples} feature rows but {} labels",
            labels.len()
        )));
    }

    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    let test_size = (n_samples as f64 * test_proportion).round() as usize;

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_indices, train_indices) = indices.split_at(test_size.min(n_samples));

    if train_indices.is_empty() || test_indices.is_empty() {
        return Err(AnalysisError::InsufficientData(format!(
            "test proportion {test_proportion} leaves an empty partition for {n_samples} samples"
        )));
    }

    let split = Split {
        train_features: features.select(Axis(0), train_indices),
        train_labels: labels.select(Axis(0), train_indices),
        test_features: features.select(Axis(0), test_indices),
        test_labels: labels.select(Axis(0), test_indices),
    };

    if has_single_class(&split.train_labels) || has_single_class(&split.test_labels) {
        return Err(AnalysisError::InsufficientData(
            "a partition contains a single class".to_string(),
        ));
    }

    Ok(split)
}

/// Fits every registered classifier on a fresh seeded train split and
/// scores it on the complementary test split. Each classifier is fit and
/// scored independently; only its own learned parameters are mutated.
pub fn evaluate(
    classifiers: &mut Registry,
    features: &Array2<f64>,
    labels: &Array1<f64>,
    test_proportion: f64,
    seed: u64,
) -> Result<ScoreTable> {
    let split = train_test_split(features, labels, test_proportion, seed)?;

    let mut scores = ScoreTable::new();
    for (name, classifier) in classifiers.iter_mut() {
        classifier.fit(&split.train_features, &split.train_labels);
        scores.insert(
            name.clone(),
            classifier.score(&split.test_features, &split.test_labels),
        );
    }

    Ok(scores)
}

/// `steps` evenly spaced values over `[start, end]`, endpoints exact.
fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    let interval = (end - start) / (steps - 1) as f64;
    (0..steps)
        .map(|i| {
            if i == steps - 1 {
                end
            } else {
                start + i as f64 * interval
            }
        })
        .collect()
}

/// Evaluates the registry at `steps` test proportions evenly spaced over
/// `[min_proportion, max_proportion]` and returns one accuracy curve per
/// classifier, aligned to the proportion sequence. The same seed goes into
/// every split, so repeated sweeps with identical inputs are identical.
pub fn sweep(
    classifiers: &mut Registry,
    features: &Array2<f64>,
    labels: &Array1<f64>,
    min_proportion: f64,
    max_proportion: f64,
    steps: usize,
    seed: u64,
) -> Result<ScoreCurves> {
    if steps < 2 {
        return Err(AnalysisError::invalid_parameter(
            "steps",
            format!("{steps} is below the minimum of 2"),
        ));
    }
    if min_proportion >= max_proportion {
        return Err(AnalysisError::invalid_parameter(
            "min_proportion",
            format!("{min_proportion} is not below max_proportion {max_proportion}"),
        ));
    }

    let mut curves: ScoreCurves = classifiers
        .keys()
        .map(|name| (name.clone(), Vec::with_capacity(steps)))
        .collect();

    for proportion in linspace(min_proportion, max_proportion, steps) {
        log::info!("evaluating at test proportion {proportion:.3}");
        let scores = evaluate(classifiers, features, labels, proportion, seed)?;

        for (name, score) in scores {
            curves
                .get_mut(&name)
                .expect("curves are keyed by the same registry")
                .push((proportion, score));
        }
    }

    Ok(curves)
}
