// ============================================================
// Layer 5: Permutation Feature Importance
// ============================================================
// How much does the model lean on each feature?
//
//   1. Score the model on the untouched test set (baseline)
//   2. For one column, shuffle its values across rows. The
//      column keeps its distribution but loses any link to
//      the label.
//   3. Re-score. Repeat n_repeats times.
//   4. importance = baseline - mean(shuffled scores)
//
// A large drop means the model depends on that column.
// A drop near zero means the column could be removed.
//
// One RNG, seeded once, drives every shuffle in column order,
// so a fixed seed reproduces the exact same permutations.
//
// Reference: Breiman (2001) Random Forests, §10
//            rand crate documentation (SliceRandom)

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::dataset::ClassificationSample;
use crate::domain::traits::ScoreMetric;
use crate::infra::progress;

/// Anything that maps samples to predicted class ids.
pub trait Predictor {
    fn predict(&self, samples: &[ClassificationSample]) -> Vec<usize>;
}

/// Knobs for the permutation loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImportanceSettings {
    pub n_repeats: usize,
    pub seed:      u64,
}

impl Default for ImportanceSettings {
    fn default() -> Self {
        Self { n_repeats: 30, seed: 42 }
    }
}

/// Importance score of one feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,

    /// baseline score - mean shuffled score
    pub importance: f64,

    /// Standard deviation of the shuffled scores
    pub std: f64,
}

/// Permutation importance for every feature column, in column order.
pub fn permutation_importance<P, M>(
    predictor:     &P,
    metric:        &M,
    samples:       &[ClassificationSample],
    feature_names: &[String],
    settings:      ImportanceSettings,
) -> Vec<FeatureImportance>
where
    P: Predictor,
    M: ScoreMetric,
{
    let Some(first) = samples.first() else {
        return Vec::new();
    };
    let num_features = first.feature_count();

    let targets: Vec<usize> = samples.iter().map(|s| s.label).collect();
    let baseline = metric.score(&targets, &predictor.predict(samples));
    tracing::info!("Permutation importance baseline score: {:.4}", baseline);

    let mut rng      = StdRng::seed_from_u64(settings.seed);
    let mut permuted = samples.to_vec();
    let mut result   = Vec::with_capacity(num_features);

    let pb = progress::create_progress_bar(num_features as u64, "Permutation importance");

    for col in 0..num_features {
        let original: Vec<f32> = samples.iter().map(|s| s.features[col]).collect();
        let mut scores = Vec::with_capacity(settings.n_repeats);

        for _ in 0..settings.n_repeats {
            let mut column = original.clone();
            column.shuffle(&mut rng);
            set_column(&mut permuted, col, &column);
            scores.push(metric.score(&targets, &predictor.predict(&permuted)));
        }
        set_column(&mut permuted, col, &original);

        let (mean, std) = mean_std(&scores);
        let feature = feature_names
            .get(col)
            .cloned()
            .unwrap_or_else(|| format!("feature_{col}"));

        tracing::debug!("{}: importance {:.5} ± {:.5}", feature, baseline - mean, std);
        result.push(FeatureImportance {
            feature,
            importance: if scores.is_empty() { 0.0 } else { baseline - mean },
            std,
        });
        pb.inc(1);
    }

    progress::finish_with_success(&pb, "Permutation importance done");
    result
}

/// Copy of `importances` ordered from most to least important.
pub fn ranked(importances: &[FeatureImportance]) -> Vec<FeatureImportance> {
    let mut sorted = importances.to_vec();
    sorted.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted
}

fn set_column(samples: &mut [ClassificationSample], col: usize, values: &[f32]) {
    for (s, &v) in samples.iter_mut().zip(values) {
        s.features[col] = v;
    }
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n    = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var  = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}
