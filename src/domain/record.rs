// ============================================================
// Layer 3: Accident Record
// ============================================================
// One row of the accident table after parsing:
//   - the numeric feature vector (every column except the
//     label and the year)
//   - the raw cause label, kept as text until it is encoded
//   - the year, used only to decide train vs test
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// Name of the column holding the accident-cause label
pub const LABEL_COLUMN: &str = "cause_code_individual";

/// Name of the column holding the accident year
pub const YEAR_COLUMN: &str = "year";

/// A single accident row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentRecord {
    /// Feature values in header order
    pub features: Vec<f32>,

    /// Raw cause code exactly as it appears in the file
    pub label: String,

    /// Accident year; dropped once the split is made
    pub year: i32,
}

impl AccidentRecord {
    pub fn new(features: Vec<f32>, label: impl Into<String>, year: i32) -> Self {
        Self {
            features,
            label: label.into(),
            year,
        }
    }
}

/// Every record of a file, plus the feature column names
/// so importance scores can be reported by name.
#[derive(Debug, Clone, Default)]
pub struct LoadedTable {
    pub feature_names: Vec<String>,
    pub records:       Vec<AccidentRecord>,
}

impl LoadedTable {
    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }
}
