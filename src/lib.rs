pub mod classifier;
pub mod error;
pub mod evaluate;
pub mod gradient_descent;
pub mod parse;
pub mod pca;
pub mod plot;
pub mod ridge_regression;
pub mod support_vector_machine;
