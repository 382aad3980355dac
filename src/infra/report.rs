// ============================================================
// Layer 6: Report Writer
// ============================================================
// Persists the results of a run as plain files, in place of the
// plot windows an interactive notebook would open:
//
//   <output-dir>/
//     train_config.json       ← hyperparameters of the run
//     confusion_matrix.csv    ← rows = true class, cols = predicted
//     feature_importance.csv  ← most important feature first
//     report.json             ← everything above plus the curves
//
// Also renders the console tables printed at the end of a run.
//
// Reference: csv crate documentation (Writer, serialize)
//            comfy-table documentation

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Table};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::{evaluator::ConfusionMatrix, importance::FeatureImportance};

/// Writes run artifacts into one directory.
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Create the writer, creating the directory like `mkdir -p`.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save the training configuration as pretty JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<PathBuf> {
        self.write_json("train_config.json", cfg)
    }

    /// Serialize any value to `<dir>/<name>` as pretty JSON.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Wrote '{}'", path.display());
        Ok(path)
    }

    /// Confusion matrix as CSV. The header and first column carry the
    /// original class labels rather than the encoded ids.
    pub fn write_confusion_matrix(
        &self,
        matrix: &ConfusionMatrix,
        labels: &[String],
    ) -> Result<PathBuf> {
        let path = self.dir.join("confusion_matrix.csv");
        let mut w = csv::Writer::from_path(&path)
            .with_context(|| format!("Cannot create '{}'", path.display()))?;

        let (rows, _) = matrix.shape();
        let label_of = |i: usize| labels.get(i).cloned().unwrap_or_else(|| i.to_string());

        let mut header = vec!["true\\predicted".to_string()];
        header.extend((0..rows).map(label_of));
        w.write_record(&header)?;

        for t in 0..rows {
            let mut record = vec![label_of(t)];
            record.extend(matrix.row(t).iter().map(u64::to_string));
            w.write_record(&record)?;
        }
        w.flush()?;

        tracing::debug!("Wrote '{}'", path.display());
        Ok(path)
    }

    /// One row per feature in the order given.
    pub fn write_importances(&self, importances: &[FeatureImportance]) -> Result<PathBuf> {
        let path = self.dir.join("feature_importance.csv");
        let mut w = csv::Writer::from_path(&path)
            .with_context(|| format!("Cannot create '{}'", path.display()))?;
        for imp in importances {
            w.serialize(imp)?;
        }
        w.flush()?;

        tracing::debug!("Wrote '{}'", path.display());
        Ok(path)
    }
}

// ─── Console tables ───────────────────────────────────────────────────────────

/// Table of the `top_k` highest-ranked features.
pub fn importance_table(ranked: &[FeatureImportance], top_k: usize) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Rank").add_attribute(Attribute::Bold),
        Cell::new("Feature").add_attribute(Attribute::Bold),
        Cell::new("Importance").add_attribute(Attribute::Bold),
        Cell::new("Std").add_attribute(Attribute::Bold),
    ]);

    for (rank, imp) in ranked.iter().take(top_k).enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&imp.feature),
            Cell::new(format!("{:.5}", imp.importance)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.5}", imp.std)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn importances() -> Vec<FeatureImportance> {
        vec![
            FeatureImportance { feature: "speed".into(), importance: 0.12, std: 0.01 },
            FeatureImportance { feature: "light".into(), importance: 0.03, std: 0.00 },
        ]
    }

    #[test]
    fn test_confusion_matrix_csv_uses_labels() {
        let dir    = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path()).unwrap();
        let matrix = ConfusionMatrix::from_predictions(2, &[0, 1, 1], &[0, 0, 1]);

        let path = writer
            .write_confusion_matrix(&matrix, &["A12".to_string(), "B07".to_string()])
            .unwrap();
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "true\\predicted,A12,B07");
        assert_eq!(lines[1], "A12,1,0");
        assert_eq!(lines[2], "B07,1,1");
    }

    #[test]
    fn test_importance_csv_has_header_and_rows() {
        let dir    = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path()).unwrap();
        let path   = writer.write_importances(&importances()).unwrap();

        let text = fs::read_to_string(path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("feature,importance,std"));
        assert!(lines.next().unwrap().starts_with("speed,0.12"));
    }

    #[test]
    fn test_importance_table_respects_top_k() {
        let rendered = importance_table(&importances(), 1).to_string();
        assert!(rendered.contains("speed"));
        assert!(!rendered.contains("light"));
    }

    #[test]
    fn test_writer_creates_nested_dir() {
        let dir    = tempfile::tempdir().unwrap();
        let nested = dir.path().join("runs").join("a");
        let writer = ReportWriter::new(&nested).unwrap();
        writer.save_config(&TrainConfig::default()).unwrap();
        assert!(nested.join("train_config.json").exists());
    }
}
