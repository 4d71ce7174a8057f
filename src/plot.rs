use ndarray::Array1;
use plotters::prelude::*;
use std::path::Path;

use crate::error::{AnalysisError, Result};
use crate::evaluate::ScoreCurves;

const PLOT_SIZE: (u32, u32) = (800, 600);
const CUTOFF_COLOR: RGBColor = RGBColor(255, 165, 0);

fn plot_error(error: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::Plot(error.to_string())
}

/// Renders one accuracy-vs-test-proportion line per classifier.
pub fn score_curves(curves: &ScoreCurves, path: &Path) -> Result<()> {
    let proportions: Vec<f64> = curves
        .values()
        .next()
        .map(|curve| curve.iter().map(|&(proportion, _)| proportion).collect())
        .unwrap_or_default();
    let x_min = proportions.first().copied().unwrap_or(0.0);
    let x_max = proportions.last().copied().unwrap_or(1.0);

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Test proportion influence over score", ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, 0.0..1.0)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("Test proportion")
        .y_desc("Score")
        .draw()
        .map_err(plot_error)?;

    for (index, (name, curve)) in curves.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();
        chart
            .draw_series(LineSeries::new(curve.iter().copied(), color))
            .map_err(plot_error)?
            .label(name.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_error)?;

    root.present().map_err(plot_error)
}

/// Renders the per-component variance spectrum with the chosen cutoff
/// marked by a vertical line.
pub fn variance_spectrum(eigenvalues: &Array1<f64>, cutoff: usize, path: &Path) -> Result<()> {
    let y_max = eigenvalues.iter().copied().fold(0.0, f64::max) * 1.05;
    let x_max = eigenvalues.len() as f64;

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Keeping {cutoff} components"),
            ("sans-serif", 24).into_font(),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max.max(1.0))
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("Eigenvalue index")
        .y_desc("Eigenvalue")
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(LineSeries::new(
            eigenvalues
                .iter()
                .enumerate()
                .map(|(index, &value)| (index as f64, value)),
            &BLUE,
        ))
        .map_err(plot_error)?;

    chart
        .draw_series(LineSeries::new(
            vec![(cutoff as f64, 0.0), (cutoff as f64, y_max)],
            &CUTOFF_COLOR,
        ))
        .map_err(plot_error)?;

    root.present().map_err(plot_error)
}
