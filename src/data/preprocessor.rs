// ============================================================
// Layer 4: Preprocessor (Label Encoding + Feature Scaling)
// ============================================================
// Two fitted transforms turn raw records into model inputs:
//
//   LabelEncoder   → cause code text  → class id in [0, n)
//   StandardScaler → raw feature value → (x - mean) / std
//
// Both are fitted on the TRAINING split only and then applied
// unchanged to the test split. Fitting on test rows would leak
// the held-out year into the statistics the model trains on.
//
// Class ids follow the sorted order of the distinct training
// labels, so the same data always yields the same ids.
//
// Reference: Rust Book §8 (Collections)
//            Rust Book §9 (Error Handling)

use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::HashMap};

use crate::domain::error::{DataError, DataResult};

// ─── LabelEncoder ─────────────────────────────────────────────────────────────
/// Bijection between distinct training labels and `0..num_classes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Class id → label text
    classes: Vec<String>,

    /// Label text → class id
    index: HashMap<String, usize>,

    /// Every training label was a number; labels are then compared
    /// by value, so "3", "3.0" and "03" are one class.
    numeric: bool,
}

impl LabelEncoder {
    /// Learn the class list from the training labels.
    ///
    /// Labels are ordered numerically when every one of them parses
    /// as a number ("2" before "10"), lexicographically otherwise.
    pub fn fit<'a, I>(labels: I) -> DataResult<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let raw: Vec<&str> = labels.into_iter().collect();
        if raw.is_empty() {
            return Err(DataError::EmptyFit { what: "label encoder" });
        }

        let numeric = raw.iter().all(|l| numeric_value(l).is_some());
        let mut classes: Vec<String> = raw
            .iter()
            .map(|l| canonical(numeric, l).into_owned())
            .collect();

        if numeric {
            classes.sort_by(|a, b| {
                let (x, y) = (numeric_value(a).unwrap_or(0.0), numeric_value(b).unwrap_or(0.0));
                x.total_cmp(&y)
            });
        } else {
            classes.sort();
        }
        classes.dedup();

        let index = classes
            .iter()
            .enumerate()
            .map(|(id, label)| (label.clone(), id))
            .collect();

        tracing::debug!("Label encoder fitted: {} classes", classes.len());
        Ok(Self { classes, index, numeric })
    }

    /// Class id for a label; labels unseen during fit are an error.
    pub fn transform(&self, label: &str) -> DataResult<usize> {
        self.index
            .get(&*canonical(self.numeric, label))
            .copied()
            .ok_or_else(|| DataError::unseen_label(label))
    }

    /// Encode a batch of labels, failing on the first unseen one.
    pub fn transform_all<'a, I>(&self, labels: I) -> DataResult<Vec<usize>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        labels.into_iter().map(|l| self.transform(l)).collect()
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Finite numeric value of a label, if it is one.
fn numeric_value(label: &str) -> Option<f64> {
    label.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Shortest text for a numeric label ("2.0" → "2", "01" → "1").
fn canonical(numeric: bool, label: &str) -> Cow<'_, str> {
    match numeric.then(|| numeric_value(label)).flatten() {
        Some(v) => Cow::Owned((v + 0.0).to_string()),
        None    => Cow::Borrowed(label),
    }
}

// ─── StandardScaler ───────────────────────────────────────────────────────────
/// Per-feature mean and population standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds:  Vec<f64>,
}

impl StandardScaler {
    /// Compute per-column statistics over `rows`.
    ///
    /// Uses the population variance (divide by n). A constant column
    /// gets std = 1 so it scales to all zeros instead of NaN.
    pub fn fit(rows: &[Vec<f32>]) -> DataResult<Self> {
        let Some(first) = rows.first() else {
            return Err(DataError::EmptyFit { what: "standard scaler" });
        };
        let width = first.len();
        let n     = rows.len() as f64;

        let mut sums = vec![0.0f64; width];
        for row in rows {
            check_width(width, row)?;
            for (s, &x) in sums.iter_mut().zip(row) {
                *s += x as f64;
            }
        }
        let means: Vec<f64> = sums.into_iter().map(|s| s / n).collect();

        // Second pass over centred values keeps the variance accurate
        // for columns with large offsets (e.g. coordinates).
        let mut sq = vec![0.0f64; width];
        for row in rows {
            for ((acc, &x), m) in sq.iter_mut().zip(row).zip(&means) {
                let d = x as f64 - m;
                *acc += d * d;
            }
        }
        let stds = sq
            .into_iter()
            .map(|v| {
                let std = (v / n).sqrt();
                if std > 0.0 { std } else { 1.0 }
            })
            .collect();

        Ok(Self { means, stds })
    }

    /// Scale every row in place with the fitted statistics.
    pub fn transform(&self, rows: &mut [Vec<f32>]) -> DataResult<()> {
        for row in rows.iter_mut() {
            self.transform_row(row)?;
        }
        Ok(())
    }

    pub fn transform_row(&self, row: &mut [f32]) -> DataResult<()> {
        check_width(self.means.len(), row)?;
        for ((x, m), s) in row.iter_mut().zip(&self.means).zip(&self.stds) {
            *x = ((*x as f64 - m) / s) as f32;
        }
        Ok(())
    }

}

fn check_width(expected: usize, row: &[f32]) -> DataResult<()> {
    if row.len() != expected {
        return Err(DataError::FeatureCount { expected, found: row.len() });
    }
    Ok(())
}
