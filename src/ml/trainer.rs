// ============================================================
// Layer 5: Training Loop
// ============================================================
// Mini-batch training with Burn's DataLoader and Adam.
//
// Per epoch:
//   1. Shuffled training batches: forward → cross-entropy →
//      backward → Adam step at the scheduled learning rate
//   2. Unshuffled pass over the held-out year, no gradients
//   3. Record one EpochMetrics row
//
// The learning-rate scheduler is stepped once at the start of
// each epoch, so it counts epochs rather than batches.
//
// There is no early stopping and no "best epoch" checkpoint:
// the model returned is the one after the final epoch.
//
// Backend notes:
//   - Training runs on an AutodiffBackend for gradients
//   - model.valid() returns the same model on B::InnerBackend
//   - the validation batcher must also use B::InnerBackend
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{ensure, Result};
use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    lr_scheduler::LrScheduler,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::TabularBatcher, dataset::TabularDataset};
use crate::infra::{
    metrics::{EpochMetrics, TrainingHistory},
    progress,
};
use crate::ml::{
    evaluator::{argmax_ids, evaluate},
    model::{ClassifierConfig, FeedForwardClassifier},
    schedule,
};

/// Trained model (on the inner backend) and its learning curves.
pub struct TrainingOutcome<B: Backend> {
    pub model:   FeedForwardClassifier<B>,
    pub history: TrainingHistory,
}

// ─── EpochAccumulator ─────────────────────────────────────────────────────────
/// Running totals for one epoch, owned by the loop body.
#[derive(Debug, Default, Clone, Copy)]
pub struct EpochAccumulator {
    loss_sum: f64,
    correct:  usize,
    seen:     usize,
}

impl EpochAccumulator {
    /// Add one batch: its mean loss, number of correct predictions, size.
    pub fn record(&mut self, batch_loss: f64, correct: usize, batch_size: usize) {
        self.loss_sum += batch_loss * batch_size as f64;
        self.correct  += correct;
        self.seen     += batch_size;
    }

    pub fn mean_loss(&self) -> f64 {
        if self.seen > 0 { self.loss_sum / self.seen as f64 } else { f64::NAN }
    }

    pub fn accuracy(&self) -> f64 {
        if self.seen > 0 { self.correct as f64 / self.seen as f64 } else { 0.0 }
    }

    pub fn seen(&self) -> usize {
        self.seen
    }
}

/// Train a fresh classifier described by `model_cfg`.
pub fn run_training<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    model_cfg:     &ClassifierConfig,
    train_dataset: TabularDataset,
    val_dataset:   TabularDataset,
    device:        &B::Device,
) -> Result<TrainingOutcome<B::InnerBackend>> {
    ensure!(cfg.batch_size > 0, "batch size must be at least 1");
    ensure!(!train_dataset.is_empty(), "training set is empty");

    B::seed(cfg.seed);

    let mut model: FeedForwardClassifier<B> = model_cfg.init(device);
    tracing::info!(
        "Model ready: layers {:?}, {} parameters",
        model_cfg.layer_sizes(),
        model.num_params(),
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();
    let mut scheduler = schedule::step_lr(cfg.lr)?;

    let train_len     = train_dataset.len();
    let train_batches = train_len.div_ceil(cfg.batch_size) as u64;

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_loader = DataLoaderBuilder::new(TabularBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend, no autodiff overhead) ───────────
    let val_loader = DataLoaderBuilder::new(TabularBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .build(val_dataset);

    let mut history = TrainingHistory::new();

    for epoch in 0..cfg.epochs {
        let lr = scheduler.step();

        // ── Training phase ────────────────────────────────────────────────────
        let mut acc = EpochAccumulator::default();
        let pb = progress::create_progress_bar(
            train_batches,
            &format!("Epoch {}/{}, Training", epoch + 1, cfg.epochs),
        );

        for batch in train_loader.iter() {
            let n = batch.len();
            let (loss, logits) = model.forward_loss(batch.features, batch.targets.clone());

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            let correct = argmax_ids(logits)
                .iter()
                .zip(batch.targets.into_data().iter::<i64>())
                .filter(|(p, t)| **p as i64 == *t)
                .count();
            acc.record(loss_val, correct, n);

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(lr, model, grads);

            pb.inc(1);
        }
        pb.finish_and_clear();

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();
        let val = evaluate(&model_valid, val_loader.iter());

        let metrics = EpochMetrics {
            epoch:      epoch + 1,
            lr,
            train_loss: acc.mean_loss(),
            train_acc:  acc.accuracy(),
            val_loss:   val.loss,
            val_acc:    val.accuracy,
        };

        println!(
            "Epoch {:>3}/{} | lr={:.1e} | train_loss={:.4} | train_acc={:.1}% | val_loss={:.4} | val_acc={:.1}%",
            metrics.epoch, cfg.epochs, lr,
            metrics.train_loss, metrics.train_acc * 100.0,
            metrics.val_loss, metrics.val_acc * 100.0,
        );
        tracing::debug!("Epoch {} covered {} training samples", metrics.epoch, acc.seen());

        history.push(metrics);
    }

    if let Some(last) = history.last() {
        tracing::info!(
            "Training complete after {} epochs (val_loss={:.4}, val_acc={:.4})",
            history.len(), last.val_loss, last.val_acc,
        );
    }
    Ok(TrainingOutcome {
        model: model.valid(),
        history,
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    use crate::data::dataset::ClassificationSample;

    type B = Autodiff<NdArray>;

    #[test]
    fn test_accumulator_weights_by_batch_size() {
        let mut acc = EpochAccumulator::default();
        acc.record(1.0, 2, 2);
        acc.record(4.0, 0, 1);
        // (1*2 + 4*1) / 3
        assert!((acc.mean_loss() - 2.0).abs() < 1e-12);
        assert!((acc.accuracy() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(acc.seen(), 3);
    }

    #[test]
    fn test_empty_accumulator() {
        let acc = EpochAccumulator::default();
        assert!(acc.mean_loss().is_nan());
        assert_eq!(acc.accuracy(), 0.0);
    }

    /// Two well-separated clusters in two dimensions
    fn blobs(n: usize) -> Vec<ClassificationSample> {
        (0..n)
            .map(|i| {
                let label = i % 2;
                let centre = if label == 0 { -2.0 } else { 2.0 };
                let jitter = (i as f32 * 0.37).sin() * 0.3;
                ClassificationSample::new(vec![centre + jitter, centre - jitter], label)
            })
            .collect()
    }

    #[test]
    fn test_history_has_one_entry_per_epoch() {
        let cfg = TrainConfig {
            epochs:     6,
            batch_size: 8,
            lr:         5e-2,
            ..TrainConfig::default()
        };
        let model_cfg = ClassifierConfig::new(2, 2).with_hidden_sizes(vec![16, 8]);
        let device = Default::default();

        let outcome = run_training::<B>(
            &cfg,
            &model_cfg,
            TabularDataset::new(blobs(40)),
            TabularDataset::new(blobs(10)),
            &device,
        )
        .unwrap();

        let h = outcome.history;
        assert_eq!(h.len(), 6);
        let lrs: Vec<f64> = h.epochs().iter().map(|m| m.lr).collect();
        assert_eq!(lrs[0], 5e-2);
        assert_eq!(lrs[2], 5e-2);
        assert!((lrs[3] - 5e-3).abs() < 1e-12);
        for m in h.epochs() {
            assert!((0.0..=1.0).contains(&m.train_acc));
            assert!((0.0..=1.0).contains(&m.val_acc));
            assert!(m.train_loss.is_finite());
        }
        // Two separable clusters are learned within the first lr step.
        assert!(h.last().unwrap().val_acc >= 0.8);
    }

    #[test]
    fn test_empty_training_set_is_rejected() {
        let cfg = TrainConfig::default();
        let model_cfg = ClassifierConfig::new(2, 2);
        let device = Default::default();
        let result = run_training::<B>(
            &cfg,
            &model_cfg,
            TabularDataset::new(Vec::new()),
            TabularDataset::new(blobs(4)),
            &device,
        );
        assert!(result.is_err());
    }
}
