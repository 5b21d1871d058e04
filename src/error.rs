//! Error taxonomy shared by the load, split, train, and predict stages.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised anywhere in the estimation pipeline.
#[derive(Debug, Error)]
pub enum EstimateError {
    /// The source file does not exist at the configured path.
    #[error("Data file not found at {}", path.display())]
    MissingInput { path: PathBuf },
    /// The delimited file exists but could not be parsed.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: csv::Error,
    },
    /// A requested column is not part of the table.
    #[error("Column '{column}' not found")]
    SchemaLookup { column: String },
    /// Caller-supplied arguments or data violate a precondition.
    #[error("{0}")]
    Validation(String),
    /// A column that must be numeric holds text values.
    #[error("Column '{column}' is not numeric")]
    NonNumeric { column: String },
    /// A numeric column holds a missing value where a number is required.
    #[error("Column '{column}' has a missing value at row {row}")]
    MissingValue { column: String, row: usize },
    /// The least-squares solver rejected the training data.
    #[error("Model fit failed: {0}")]
    FitFailed(String),
    /// Prediction input columns differ from the columns the model was trained on.
    #[error("Feature mismatch: expected [{}], found [{}]", expected.join(", "), found.join(", "))]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl EstimateError {
    /// Short remediation text suitable for showing next to the error message.
    pub fn remediation_hint(&self) -> String {
        match self {
            EstimateError::MissingInput { path } => missing_file_hint(path),
            EstimateError::Read { path, .. } => {
                format!("Check that `{}` is a valid CSV file with a header row.", path.display())
            }
            EstimateError::SchemaLookup { column } => {
                format!("Make sure the dataset has a `{column}` column.")
            }
            EstimateError::NonNumeric { .. } | EstimateError::MissingValue { .. } => {
                "Feature columns must be fully numeric; clean the dataset and restart.".to_string()
            }
            _ => "Fix the underlying problem and restart the session.".to_string(),
        }
    }
}

fn missing_file_hint(path: &std::path::Path) -> String {
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    match path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        Some(dir) => format!("Make sure `{file}` is placed in `{}/`.", dir.display()),
        None => format!("Make sure `{file}` is placed in the working directory."),
    }
}
