use csv::ReaderBuilder;
use ndarray::{Array1, Array2};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{AnalysisError, Result};

/// Column roles of the raw table. The defaults reproduce the legacy layout
/// of the Wisconsin diagnostic file: a row identifier, a categorical
/// diagnosis code, numeric features, and a schemaless trailing column that
/// carries no analytical value. Keeping the slicing behind an explicit
/// layout lets the loader validate it against the header instead of
/// silently mis-slicing a changed schema.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    pub identifier_column: usize,
    pub label_column: usize,
    /// Diagnosis token mapped to label 1.0; everything else maps to 0.0.
    pub positive_label: String,
    /// Number of trailing columns excluded from the feature matrix.
    pub trailing_ignored: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            identifier_column: 0,
            label_column: 1,
            positive_label: "M".to_string(),
            trailing_ignored: 1,
        }
    }
}

impl ColumnLayout {
    fn feature_range(&self, width: usize) -> Result<std::ops::Range<usize>> {
        let first = self.identifier_column.max(self.label_column) + 1;
        let last = width.saturating_sub(self.trailing_ignored);

        if self.label_column >= width || first >= last {
            return Err(AnalysisError::DataFormat(format!(
                "table with {width} columns leaves no feature columns for layout {self:?}"
            )));
        }

        Ok(first..last)
    }
}

/// Feature matrix and aligned binary label vector.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub features: Array2<f64>,
    pub labels: Array1<f64>,
}

impl Dataset {
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }
}

/// Reads a headered delimited file into a [`Dataset`] according to `layout`.
///
/// Fails with [`AnalysisError::DataFormat`] when the label column is absent,
/// a row's width disagrees with the header, or a selected feature cell does
/// not parse as a number.
pub fn load(path: impl AsRef<Path>, layout: &ColumnLayout) -> Result<Dataset> {
    let file = File::open(path.as_ref())?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let width = reader.headers()?.len();
    let feature_range = layout.feature_range(width)?;

    let mut labels = Vec::new();
    let mut values = Vec::new();
    let mut rows = 0;

    for (row, result) in reader.records().enumerate() {
        let record = result?;

        if record.len() != width {
            return Err(AnalysisError::DataFormat(format!(
                "row {row} has {} columns, header has {width}",
                record.len()
            )));
        }

        let diagnosis = record.get(layout.label_column).ok_or_else(|| {
            AnalysisError::DataFormat(format!("row {row} is missing the label column"))
        })?;
        labels.push(if diagnosis == layout.positive_label {
            1.0
        } else {
            0.0
        });

        for column in feature_range.clone() {
            let cell = record.get(column).unwrap_or_default();
            let value: f64 = cell.trim().parse().map_err(|_| {
                AnalysisError::DataFormat(format!(
                    "non-numeric value {cell:?} at row {row}, column {column}"
                ))
            })?;
            values.push(value);
        }

        rows += 1;
    }

    let features = Array2::from_shape_vec((rows, feature_range.len()), values)
        .map_err(|err| AnalysisError::DataFormat(err.to_string()))?;

    Ok(Dataset {
        features,
        labels: Array1::from_vec(labels),
    })
}
