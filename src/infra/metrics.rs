// ============================================================
// Layer 6: Training Metrics
// ============================================================
// Keeps the per-epoch learning curves and writes them to CSV.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - lr:         learning rate used for that epoch
//   - train_loss: sample-weighted cross-entropy on the training set
//   - train_acc:  fraction of training samples predicted correctly
//   - val_loss:   cross-entropy on the held-out year
//   - val_acc:    accuracy on the held-out year
//
// Output file: <output-dir>/metrics.csv
//
//   epoch,lr,train_loss,train_acc,val_loss,val_acc
//   1,0.001000000,3.124500,0.123000,3.089200,0.118000
//   ...
//
// The CSV stands in for the loss/accuracy plots: any spreadsheet
// or plotting tool can draw the two curves from it.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

const HEADER: &str = "epoch,lr,train_loss,train_acc,val_loss,val_acc";

/// One row of metrics for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    pub lr: f64,

    pub train_loss: f64,

    /// Range: [0.0, 1.0]
    pub train_acc: f64,

    pub val_loss: f64,

    /// Range: [0.0, 1.0]
    pub val_acc: f64,
}

// ─── TrainingHistory ──────────────────────────────────────────────────────────
/// Append-only list of epoch metrics, one entry per finished epoch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingHistory {
    epochs: Vec<EpochMetrics>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, m: EpochMetrics) {
        self.epochs.push(m);
    }

    pub fn epochs(&self) -> &[EpochMetrics] {
        &self.epochs
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }
}

// ─── MetricsLogger ────────────────────────────────────────────────────────────
/// Writes epoch metrics to `metrics.csv` in the output directory.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the logger and start a fresh CSV with only the header.
    /// A previous run's file in the same directory is replaced.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "{HEADER}")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.9},{:.6},{:.6},{:.6},{:.6}",
            m.epoch,
            m.lr,
            m.train_loss,
            m.train_acc,
            m.val_loss,
            m.val_acc,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );
        Ok(())
    }

    /// Append every epoch of a history.
    pub fn log_history(&self, history: &TrainingHistory) -> Result<()> {
        for m in history.epochs() {
            self.log(m)?;
        }
        Ok(())
    }
}
