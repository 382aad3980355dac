use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Linear, LinearConfig,
        Relu,
    },
    prelude::*,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally. Do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct ClassifierConfig {
    pub input_size:  usize,
    pub num_classes: usize,
    #[config(default = "vec![512, 256, 128]")]
    pub hidden_sizes: Vec<usize>,
    #[config(default = 0.5)]
    pub dropout: f64,
}

impl ClassifierConfig {
    /// Layer widths `[input_size] + hidden_sizes + [num_classes]`.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_sizes.len() + 2);
        sizes.push(self.input_size);
        sizes.extend_from_slice(&self.hidden_sizes);
        sizes.push(self.num_classes);
        sizes
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> FeedForwardClassifier<B> {
        let layers = self
            .layer_sizes()
            .windows(2)
            .map(|w| LinearConfig::new(w[0], w[1]).init(device))
            .collect();
        FeedForwardClassifier {
            layers,
            activation: Relu::new(),
            dropout:    DropoutConfig::new(self.dropout).init(),
        }
    }
}

/// Fully-connected classifier: Linear → ReLU → ... → Linear (logits).
#[derive(Module, Debug)]
pub struct FeedForwardClassifier<B: Backend> {
    pub layers:     Vec<Linear<B>>,
    pub activation: Relu,
    /// Built but never applied in `forward`; the network trains without
    /// dropout regularisation.
    pub dropout:    Dropout,
}

impl<B: Backend> FeedForwardClassifier<B> {
    /// features: [batch, input_size] → logits: [batch, num_classes]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let last = self.layers.len().saturating_sub(1);
        let mut x = features;
        for (i, layer) in self.layers.iter().enumerate() {
            x = layer.forward(x);
            // No activation on the output layer: raw logits feed the loss.
            if i < last {
                x = self.activation.forward(x);
            }
        }
        x
    }

    /// Mean cross-entropy of the batch together with its logits.
    pub fn forward_loss(
        &self,
        features: Tensor<B, 2>,
        targets:  Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(features);
        let ce = CrossEntropyLossConfig::new().init(&logits.device());
        let loss = ce.forward(logits.clone(), targets);
        (loss, logits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    #[test]
    fn test_default_architecture() {
        let cfg = ClassifierConfig::new(50, 67);
        assert_eq!(cfg.layer_sizes(), vec![50, 512, 256, 128, 67]);
        assert_eq!(cfg.dropout, 0.5);

        let model: FeedForwardClassifier<B> = cfg.init(&Default::default());
        assert_eq!(model.layers.len(), 4);
    }

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let model: FeedForwardClassifier<B> = ClassifierConfig::new(3, 2)
            .with_hidden_sizes(vec![8, 4])
            .init(&device);

        let x = Tensor::<B, 2>::zeros([5, 3], &device);
        assert_eq!(model.forward(x).dims(), [5, 2]);
    }

    #[test]
    fn test_forward_is_deterministic_despite_dropout() {
        // Dropout is never applied, so two passes give identical logits.
        let device = Default::default();
        let model: FeedForwardClassifier<B> = ClassifierConfig::new(4, 3).init(&device);
        let x = Tensor::<B, 2>::ones([2, 4], &device);

        let a: Vec<f32> = model.forward(x.clone()).into_data().iter::<f32>().collect();
        let b: Vec<f32> = model.forward(x).into_data().iter::<f32>().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_loss_is_positive_scalar() {
        let device = Default::default();
        let model: FeedForwardClassifier<B> = ClassifierConfig::new(2, 3)
            .with_hidden_sizes(vec![4])
            .init(&device);
        let x = Tensor::<B, 2>::ones([4, 2], &device);
        let y = Tensor::<B, 1, Int>::from_ints([0, 1, 2, 1], &device);

        let (loss, logits) = model.forward_loss(x, y);
        assert_eq!(logits.dims(), [4, 3]);
        let loss: f64 = loss.into_scalar().elem::<f64>();
        assert!(loss > 0.0);
    }
}
