// ============================================================
// Layer 4: Tabular Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec of samples into
// the two tensors the classifier needs:
//
//   Input:  N samples, each with F scaled feature values
//   Output: features [N, F] (float), targets [N] (int)
//
// Rows are flattened in order then reshaped:
//   [r1_f1, r1_f2, ..., r1_fF, r2_f1, ..., rN_fF] → [N, F]
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ClassificationSample;

// ─── TabularBatch ─────────────────────────────────────────────────────────────
/// A mini-batch ready for the forward pass.
#[derive(Debug, Clone)]
pub struct TabularBatch<B: Backend> {
    /// Scaled features, shape [batch_size, num_features]
    pub features: Tensor<B, 2>,

    /// Encoded class ids, shape [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> TabularBatch<B> {
    pub fn len(&self) -> usize {
        self.targets.dims()[0]
    }
}

// ─── TabularBatcher ───────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the right CPU/GPU.
#[derive(Clone, Debug)]
pub struct TabularBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TabularBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ClassificationSample, TabularBatch<B>> for TabularBatcher<B> {
    fn batch(&self, items: Vec<ClassificationSample>) -> TabularBatch<B> {
        let batch_size   = items.len();
        let num_features = items.first().map_or(0, |s| s.features.len());

        let features_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();

        let labels: Vec<i32> = items
            .iter()
            .map(|s| s.label as i32)
            .collect();

        let features = Tensor::<B, 1>::from_floats(
            features_flat.as_slice(), &self.device
        ).reshape([batch_size, num_features]);

        let targets = Tensor::<B, 1, Int>::from_ints(
            labels.as_slice(), &self.device
        );

        TabularBatch { features, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes() {
        let batcher = TabularBatcher::<NdArray>::new(Default::default());
        let batch = batcher.batch(vec![
            ClassificationSample::new(vec![1.0, 2.0, 3.0], 0),
            ClassificationSample::new(vec![4.0, 5.0, 6.0], 2),
        ]);

        assert_eq!(batch.features.dims(), [2, 3]);
        assert_eq!(batch.targets.dims(), [2]);
        assert_eq!(batch.len(), 2);

        let row_two: Vec<f32> = batch.features
            .slice([1..2, 0..3])
            .into_data()
            .iter::<f32>()
            .collect();
        assert_eq!(row_two, vec![4.0, 5.0, 6.0]);

        let targets: Vec<i64> = batch.targets.into_data().iter::<i64>().collect();
        assert_eq!(targets, vec![0, 2]);
    }
}
