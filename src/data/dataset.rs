use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One scaled feature row with its encoded class id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSample {
    pub features: Vec<f32>,
    pub label:    usize,
}

impl ClassificationSample {
    pub fn new(features: Vec<f32>, label: usize) -> Self {
        Self { features, label }
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }
}

/// In-memory table of samples served to Burn's DataLoader.
#[derive(Debug, Clone)]
pub struct TabularDataset {
    samples: Vec<ClassificationSample>,
}

impl TabularDataset {
    pub fn new(samples: Vec<ClassificationSample>) -> Self { Self { samples } }
}

impl Dataset<ClassificationSample> for TabularDataset {
    fn get(&self, index: usize) -> Option<ClassificationSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
