//! Error types for loading and preparing the accident table

use thiserror::Error;

/// Result alias for data preparation steps
pub type DataResult<T> = std::result::Result<T, DataError>;

/// Everything that can go wrong between the CSV file and the tensors.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required column is absent from the header
    #[error("Missing required column '{column}'")]
    MissingColumn {
        column: String,
    },

    /// A cell could not be parsed as a number
    #[error("Row {row}: cannot parse '{value}' in column '{column}' as a number")]
    InvalidValue {
        row:    usize,
        column: String,
        value:  String,
    },

    /// A test label that never occurs in the training split
    #[error("Label '{label}' does not occur in the training data")]
    UnseenLabel {
        label: String,
    },

    /// A split ended up with no rows
    #[error("The {split} split is empty")]
    EmptySplit {
        split: &'static str,
    },

    /// A transform was fitted on zero rows
    #[error("Cannot fit {what} on an empty input")]
    EmptyFit {
        what: &'static str,
    },

    /// A row whose width differs from the fitted feature count
    #[error("Expected {expected} features, found {found}")]
    FeatureCount {
        expected: usize,
        found:    usize,
    },
}

impl DataError {
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    pub fn unseen_label(label: impl Into<String>) -> Self {
        Self::UnseenLabel {
            label: label.into(),
        }
    }
}
