// ============================================================
// Layer 3: Core Traits (Abstractions)
// ============================================================
// The application layer talks to the data source and to the
// evaluation metric through these traits, so a different file
// format or a different score can be dropped in without
// touching the workflow code.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::record::LoadedTable;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can produce the full accident table.
///
/// Implementations:
///   - CsvLoader → reads a comma-separated file
pub trait RecordSource {
    fn load_all(&self) -> Result<LoadedTable>;
}

// ─── ScoreMetric ──────────────────────────────────────────────────────────────
/// A "higher is better" score over true and predicted class ids.
/// Permutation importance measures the drop in this score.
pub trait ScoreMetric {
    fn score(&self, targets: &[usize], predictions: &[usize]) -> f64;
}

/// Fraction of predictions equal to the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accuracy;

impl ScoreMetric for Accuracy {
    fn score(&self, targets: &[usize], predictions: &[usize]) -> f64 {
        if targets.is_empty() {
            return 0.0;
        }
        let correct = targets
            .iter()
            .zip(predictions)
            .filter(|(t, p)| t == p)
            .count();
        correct as f64 / targets.len() as f64
    }
}
