use std::path::PathBuf;
use thiserror::Error;

/// Every failure the dashboard can surface to the user.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid value {value:?} in column '{column}' at row {row}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Unsupported upload '{0}': only .csv files are accepted")]
    UnsupportedUpload(String),

    #[error("No data for year {year}")]
    NoData { year: i32 },

    #[error("'{column}' total for year {year} is too large to aggregate")]
    CountOverflow { year: i32, column: &'static str },

    #[error("No dataset loaded")]
    NoDataset,

    #[error("Failed to load model {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("Model {path} expects {found} features, but 3 are required")]
    ModelShape { path: PathBuf, found: usize },

    #[error("Model returned a non-finite prediction ({0})")]
    InvalidPrediction(f64),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DashboardError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures the user can recover from by picking another year.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
