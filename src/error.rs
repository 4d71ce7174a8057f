use thiserror::Error;

/// Failure modes of the analysis pipeline. None of these are recovered from;
/// the entry point propagates them and terminates the run.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed dataset: {0}")]
    DataFormat(String),

    #[error("split produced an unusable partition: {0}")]
    InsufficientData(String),

    #[error("cumulative explained variance never reaches {threshold}")]
    ThresholdUnreachable { threshold: f64 },

    #[error("invalid parameter `{name}`: {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("failed to render plot: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    pub fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}
