// ============================================================
// Layer 5: Evaluator
// ============================================================
// No-gradient passes over a trained model:
//
//   evaluate()        → loss, accuracy and the raw predictions
//                       over a stream of batches
//   ModelPredictor    → class ids for host-side samples, used by
//                       permutation importance
//   ConfusionMatrix   → true label × predicted label counts
//
// The caller hands in a model on the inner (non-autodiff) backend,
// so nothing here records a computation graph.
//
// Reference: Burn Book §5 (Training), §6 (Inference)

use burn::{data::dataloader::batcher::Batcher, prelude::*};
use serde::Serialize;

use crate::data::{
    batcher::{TabularBatch, TabularBatcher},
    dataset::ClassificationSample,
};
use crate::ml::importance::Predictor;
use crate::ml::model::FeedForwardClassifier;

// ─── Evaluation ───────────────────────────────────────────────────────────────
/// Result of one full pass over an evaluation set.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Sample-weighted mean cross-entropy
    pub loss: f64,

    /// Fraction of correct predictions in [0, 1]
    pub accuracy: f64,

    /// Predicted class id per sample, in batch order
    pub predictions: Vec<usize>,

    /// True class id per sample, in batch order
    pub targets: Vec<usize>,
}

/// Run the model over every batch and aggregate loss and accuracy.
///
/// Batch losses are weighted by batch size so a short final batch
/// counts for exactly its share of the samples.
pub fn evaluate<B, I>(model: &FeedForwardClassifier<B>, batches: I) -> Evaluation
where
    B: Backend,
    I: IntoIterator<Item = TabularBatch<B>>,
{
    let mut loss_sum    = 0.0f64;
    let mut predictions = Vec::new();
    let mut targets     = Vec::new();

    for batch in batches {
        let n = batch.len();
        let (loss, logits) = model.forward_loss(batch.features, batch.targets.clone());
        loss_sum += loss.into_scalar().elem::<f64>() * n as f64;

        predictions.extend(argmax_ids(logits));
        targets.extend(tensor_ids(batch.targets));
    }

    let total = targets.len();
    let correct = predictions
        .iter()
        .zip(&targets)
        .filter(|(p, t)| p == t)
        .count();

    Evaluation {
        loss:     if total > 0 { loss_sum / total as f64 } else { f64::NAN },
        accuracy: if total > 0 { correct as f64 / total as f64 } else { 0.0 },
        predictions,
        targets,
    }
}

/// Predicted class id per row of a logits tensor.
pub fn argmax_ids<B: Backend>(logits: Tensor<B, 2>) -> Vec<usize> {
    // argmax(1) returns shape [batch, 1]; flatten to [batch]
    tensor_ids(logits.argmax(1).flatten::<1>(0, 1))
}

fn tensor_ids<B: Backend>(ids: Tensor<B, 1, Int>) -> Vec<usize> {
    ids.into_data()
        .iter::<i64>()
        .map(|id| id as usize)
        .collect()
}

// ─── ModelPredictor ───────────────────────────────────────────────────────────
/// Batched inference over host-side samples.
pub struct ModelPredictor<'a, B: Backend> {
    model:      &'a FeedForwardClassifier<B>,
    batcher:    TabularBatcher<B>,
    batch_size: usize,
}

impl<'a, B: Backend> ModelPredictor<'a, B> {
    pub fn new(model: &'a FeedForwardClassifier<B>, device: B::Device, batch_size: usize) -> Self {
        Self {
            model,
            batcher: TabularBatcher::new(device),
            batch_size: batch_size.max(1),
        }
    }
}

impl<B: Backend> Predictor for ModelPredictor<'_, B> {
    fn predict(&self, samples: &[ClassificationSample]) -> Vec<usize> {
        samples
            .chunks(self.batch_size)
            .flat_map(|chunk| {
                let batch = self.batcher.batch(chunk.to_vec());
                argmax_ids(self.model.forward(batch.features))
            })
            .collect()
    }
}

// ─── ConfusionMatrix ──────────────────────────────────────────────────────────
/// Counts of (true label, predicted label) pairs.
/// Rows are true classes, columns are predicted classes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionMatrix {
    num_classes: usize,
    /// Row-major counts, num_classes × num_classes
    counts: Vec<u64>,
}

impl ConfusionMatrix {
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            counts: vec![0; num_classes * num_classes],
        }
    }

    pub fn from_predictions(num_classes: usize, targets: &[usize], predictions: &[usize]) -> Self {
        let mut matrix = Self::new(num_classes);
        for (&t, &p) in targets.iter().zip(predictions) {
            matrix.add(t, p);
        }
        matrix
    }

    /// Record one pair. Ids outside the class range are ignored.
    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth < self.num_classes && predicted < self.num_classes {
            self.counts[truth * self.num_classes + predicted] += 1;
        } else {
            tracing::warn!(
                "Ignoring out-of-range pair (true={}, predicted={}) for {} classes",
                truth, predicted, self.num_classes,
            );
        }
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u64 {
        self.counts[truth * self.num_classes + predicted]
    }

    pub fn row(&self, truth: usize) -> &[u64] {
        let start = truth * self.num_classes;
        &self.counts[start..start + self.num_classes]
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_classes, self.num_classes)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Sum of the diagonal
    pub fn correct(&self) -> u64 {
        (0..self.num_classes).map(|c| self.get(c, c)).sum()
    }
}
