use std::path::Path;

use diagnosis::{
    classifier::Registry,
    evaluate::{evaluate, sweep, ScoreTable},
    gradient_descent::{LinearClassifier, LossType},
    parse::{self, ColumnLayout},
    pca::{PrincipalComponents, StandardScaler},
    plot,
    ridge_regression::RidgeClassifier,
    support_vector_machine::LinearSvm,
};

const DATA_FILEPATH: &str = "data/breast-cancer.csv";
const SEED: u64 = 1;

const TEST_PROPORTION: f64 = 0.5;
const EXPLAINED_PROPORTION: f64 = 0.99;

const SWEEP_MIN_PROPORTION: f64 = 0.1;
const SWEEP_MAX_PROPORTION: f64 = 0.9;
const SWEEP_STEPS: usize = 10;

fn registry() -> Registry {
    const LEARNING_RATE: f64 = 0.01;
    const ELASTIC_NET_REGULARIZATION: f64 = 0.01;
    const EPOCHS: usize = 1000;

    let mut classifiers = Registry::new();
    classifiers.insert(
        "RidgeClassifier".to_string(),
        Box::new(RidgeClassifier::new(10.0)),
    );
    classifiers.insert(
        "LogisticRegression".to_string(),
        Box::new(LinearClassifier::new(
            LEARNING_RATE,
            ELASTIC_NET_REGULARIZATION,
            LossType::Logistic,
            EPOCHS,
        )),
    );
    classifiers.insert(
        "ExponentialLoss".to_string(),
        Box::new(LinearClassifier::new(
            LEARNING_RATE,
            ELASTIC_NET_REGULARIZATION,
            LossType::Exponential,
            EPOCHS,
        )),
    );
    classifiers.insert(
        "LinearSvm".to_string(),
        Box::new(LinearSvm::new(0.1, 0.001, 10)),
    );

    classifiers
}

fn report(title: &str, scores: &ScoreTable) {
    println!("{title}");
    for (name, score) in scores {
        println!("  {name}: {score:.4}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DATA_FILEPATH.to_string());
    let dataset = parse::load(&path, &ColumnLayout::default())?;
    log::info!(
        "loaded {} samples with {} features from {path}",
        dataset.n_samples(),
        dataset.n_features()
    );

    let mut classifiers = registry();

    let scores = evaluate(
        &mut classifiers,
        &dataset.features,
        &dataset.labels,
        TEST_PROPORTION,
        SEED,
    )?;
    report("Scores on raw data:", &scores);

    let curves = sweep(
        &mut classifiers,
        &dataset.features,
        &dataset.labels,
        SWEEP_MIN_PROPORTION,
        SWEEP_MAX_PROPORTION,
        SWEEP_STEPS,
        SEED,
    )?;
    plot::score_curves(&curves, Path::new("scores.png"))?;

    let scaled = StandardScaler::fit(&dataset.features)?.transform(&dataset.features);
    let decomposition = PrincipalComponents::fit(&scaled)?;
    let optimal_dimension = decomposition.optimal_dimension(EXPLAINED_PROPORTION)?;
    println!(
        "Keeping {optimal_dimension} components to explain {}% of the variance",
        100.0 * EXPLAINED_PROPORTION
    );
    plot::variance_spectrum(
        &decomposition.explained_variance,
        optimal_dimension,
        Path::new("spectrum.png"),
    )?;

    let reduced = decomposition.project(&scaled, optimal_dimension);

    let scores = evaluate(
        &mut classifiers,
        &reduced,
        &dataset.labels,
        TEST_PROPORTION,
        SEED,
    )?;
    report(
        &format!(
            "Scores on data reduced to {} dimensions:",
            reduced.ncols()
        ),
        &scores,
    );

    Ok(())
}
