use nalgebra::DMatrix;
use ndarray::{Array1, Array2, Axis};

use crate::error::{AnalysisError, Result};

/// Slack in cumulative-ratio comparisons so a full-rank decomposition
/// satisfies a threshold of exactly 1.0 despite rounding in the eigenvalue
/// sum.
const RATIO_TOLERANCE: f64 = 1e-9;

/// Per-feature zero-mean / unit-variance transform, fit on the data itself.
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(data: &Array2<f64>) -> Result<Self> {
        let mean = data.mean_axis(Axis(0)).ok_or_else(|| {
            AnalysisError::InsufficientData("cannot standardize an empty matrix".to_string())
        })?;
        // Constant features pass through unscaled instead of dividing by zero.
        let scale = data
            .std_axis(Axis(0), 0.0)
            .mapv(|deviation| if deviation == 0.0 { 1.0 } else { deviation });

        Ok(Self { mean, scale })
    }

    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        (data - &self.mean) / &self.scale
    }
}

/// Full variance decomposition of a data matrix: eigendecomposition of the
/// covariance matrix, components ordered by decreasing explained variance,
/// `min(samples - 1, features)` of them retained.
pub struct PrincipalComponents {
    /// One component per row, in decreasing-variance order.
    components: Array2<f64>,
    mean: Array1<f64>,
    pub explained_variance: Array1<f64>,
    pub explained_variance_ratio: Array1<f64>,
}

impl PrincipalComponents {
    pub fn fit(data: &Array2<f64>) -> Result<Self> {
        let n_samples = data.nrows();
        let n_features = data.ncols();
        if n_samples < 2 || n_features == 0 {
            return Err(AnalysisError::InsufficientData(format!(
                "variance decomposition needs at least 2 samples and 1 feature, \
                 got {n_samples}x{n_features}"
            )));
        }

        let mean = data
            .mean_axis(Axis(0))
            .expect("matrix has at least one row");
        let centered = data - &mean;

        let covariance = centered.t().dot(&centered) / (n_samples - 1) as f64;
        let covariance =
            DMatrix::from_row_iterator(n_features, n_features, covariance.iter().copied());

        let eigen = covariance.symmetric_eigen();

        // Negative eigenvalues are numerical noise on a positive
        // semi-definite matrix.
        let mut pairs: Vec<(f64, Vec<f64>)> = eigen
            .eigenvalues
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                (
                    value.max(0.0),
                    eigen.eigenvectors.column(index).iter().copied().collect(),
                )
            })
            .collect();
        pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

        let total_variance: f64 = pairs.iter().map(|(value, _)| value).sum();
        let n_components = n_features.min(n_samples - 1);

        let explained_variance =
            Array1::from_iter(pairs.iter().take(n_components).map(|(value, _)| *value));
        let explained_variance_ratio = if total_variance > 0.0 {
            &explained_variance / total_variance
        } else {
            Array1::zeros(n_components)
        };

        let mut components = Array2::zeros((n_components, n_features));
        for (row, (_, eigenvector)) in pairs.iter().take(n_components).enumerate() {
            components
                .row_mut(row)
                .assign(&Array1::from_vec(eigenvector.clone()));
        }

        Ok(Self {
            components,
            mean,
            explained_variance,
            explained_variance_ratio,
        })
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    /// Smallest number of leading components whose cumulative explained
    /// variance reaches `explained_proportion`.
    pub fn optimal_dimension(&self, explained_proportion: f64) -> Result<usize> {
        if !(0.0..=1.0).contains(&explained_proportion) {
            return Err(AnalysisError::invalid_parameter(
                "explained_proportion",
                format!("{explained_proportion} is outside [0, 1]"),
            ));
        }

        let mut cumulative = 0.0;
        for (index, ratio) in self.explained_variance_ratio.iter().enumerate() {
            cumulative += ratio;
            if cumulative + RATIO_TOLERANCE >= explained_proportion {
                return Ok(index + 1);
            }
        }

        Err(AnalysisError::ThresholdUnreachable {
            threshold: explained_proportion,
        })
    }

    /// Projects `data` onto the top `dimension` components.
    pub fn project(&self, data: &Array2<f64>, dimension: usize) -> Array2<f64> {
        let dimension = dimension.min(self.n_components());
        let centered = data - &self.mean;

        centered.dot(&self.components.slice(ndarray::s![..dimension, ..]).t())
    }
}

/// Standardizes `data`, decomposes it, and returns the smallest dimension
/// explaining `explained_proportion` of the variance.
pub fn find_optimal_dimension(data: &Array2<f64>, explained_proportion: f64) -> Result<usize> {
    let scaled = StandardScaler::fit(data)?.transform(data);
    PrincipalComponents::fit(&scaled)?.optimal_dimension(explained_proportion)
}

/// Standardizes `data` with freshly fit parameters and projects it onto
/// exactly as many leading components as `find_optimal_dimension` selects.
pub fn apply_reduction(data: &Array2<f64>, explained_proportion: f64) -> Result<Array2<f64>> {
    let scaled = StandardScaler::fit(data)?.transform(data);
    let decomposition = PrincipalComponents::fit(&scaled)?;
    let dimension = decomposition.optimal_dimension(explained_proportion)?;

    Ok(decomposition.project(&scaled, dimension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    fn varied_data() -> Array2<f64> {
        Array2::from_shape_fn((40, 6), |(i, j)| {
            let t = i as f64;
            (t * (j + 1) as f64).sin() * (j + 1) as f64 + t * 0.1
        })
    }

    /// Five features driven by a single underlying factor.
    fn correlated_data() -> Array2<f64> {
        Array2::from_shape_fn((30, 5), |(i, j)| (i as f64 + 1.0) * (j + 1) as f64)
    }

    #[test]
    fn scaler_produces_zero_mean_unit_variance() {
        let data = varied_data();
        let scaled = StandardScaler::fit(&data).unwrap().transform(&data);

        for column in scaled.axis_iter(ndarray::Axis(1)) {
            assert_abs_diff_eq!(column.mean().unwrap(), 0.0, epsilon = 1e-10);
            assert_abs_diff_eq!(column.std(0.0), 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn scaler_leaves_constant_features_finite() {
        let mut data = varied_data();
        data.column_mut(0).fill(3.0);

        let scaled = StandardScaler::fit(&data).unwrap().transform(&data);
        assert!(scaled.iter().all(|value| value.is_finite()));
    }

    #[test]
    fn ratios_are_nonnegative_and_cumulative_is_monotone() {
        let scaled = StandardScaler::fit(&varied_data())
            .unwrap()
            .transform(&varied_data());
        let decomposition = PrincipalComponents::fit(&scaled).unwrap();

        assert!(decomposition
            .explained_variance_ratio
            .iter()
            .all(|&ratio| ratio >= 0.0));
        assert_abs_diff_eq!(
            decomposition.explained_variance_ratio.sum(),
            1.0,
            epsilon = 1e-6
        );

        let mut cumulative = 0.0;
        for &ratio in &decomposition.explained_variance_ratio {
            let next = cumulative + ratio;
            assert!(next >= cumulative);
            cumulative = next;
        }
    }

    #[test]
    fn threshold_one_selects_every_component() {
        let data = varied_data();
        let dimension = find_optimal_dimension(&data, 1.0).unwrap();

        assert_eq!(dimension, data.ncols().min(data.nrows() - 1));
    }

    #[test]
    fn threshold_zero_selects_a_single_component() {
        assert_eq!(find_optimal_dimension(&varied_data(), 0.0).unwrap(), 1);
    }

    #[test]
    fn one_factor_data_needs_one_component() {
        assert_eq!(find_optimal_dimension(&correlated_data(), 0.95).unwrap(), 1);
    }

    #[test]
    fn reduction_width_matches_optimal_dimension() {
        let data = varied_data();
        for proportion in [0.5, 0.9, 0.99] {
            let dimension = find_optimal_dimension(&data, proportion).unwrap();
            let reduced = apply_reduction(&data, proportion).unwrap();

            assert_eq!(reduced.dim(), (data.nrows(), dimension));
        }
    }

    #[test]
    fn out_of_range_proportion_is_rejected() {
        for proportion in [-0.1, 1.1] {
            let err = find_optimal_dimension(&varied_data(), proportion).unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidParameter { .. }));
        }
    }

    #[test]
    fn zero_variance_data_cannot_reach_a_positive_threshold() {
        let data = Array2::ones((10, 3));

        let err = find_optimal_dimension(&data, 0.5).unwrap_err();
        assert!(matches!(err, AnalysisError::ThresholdUnreachable { .. }));
    }
}
