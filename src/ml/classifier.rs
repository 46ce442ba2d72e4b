use burn::{
    nn::{Dropout, DropoutConfig, Linear, LinearConfig},
    prelude::*,
    tensor::activation::{log_softmax, relu},
};

use crate::data::batcher::GraphBatch;
use crate::ml::encoder::{GinEncoder, GinEncoderConfig};

#[derive(Config, Debug)]
pub struct GinClassifierConfig {
    pub encoder:     GinEncoderConfig,
    pub num_classes: usize,
    #[config(default = 0.5)]
    pub dropout: f64,
}

impl GinClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> GinClassifier<B> {
        let hidden = self.encoder.hidden;
        GinClassifier {
            encoder: self.encoder.init(device),
            fc1:     LinearConfig::new(self.encoder.embedding_dim(), hidden).init(device),
            fc2:     LinearConfig::new(hidden, self.num_classes).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

/// Encoder followed by a two-layer head producing class log-probabilities.
/// The head only sees the graph embedding.
#[derive(Module, Debug)]
pub struct GinClassifier<B: Backend> {
    pub encoder: GinEncoder<B>,
    pub fc1:     Linear<B>,
    pub fc2:     Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> GinClassifier<B> {
    /// batch → log-probabilities [num_graphs, num_classes]
    pub fn forward(&self, batch: &GraphBatch<B>) -> Tensor<B, 2> {
        let embedding = self.encoder.forward(batch).graph;
        let x = relu(self.fc1.forward(embedding));
        let x = self.dropout.forward(x);
        log_softmax(self.fc2.forward(x), 1)
    }

    pub fn forward_loss(&self, batch: &GraphBatch<B>) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let log_probs = self.forward(batch);
        let loss = nll_loss(log_probs.clone(), batch.labels.clone());
        (loss, log_probs)
    }
}

/// Mean negative log-likelihood of the target class.
pub fn nll_loss<B: Backend>(log_probs: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
    let [n, _] = log_probs.dims();
    log_probs.gather(1, targets.reshape([n, 1])).mean().neg()
}

/// Index of the highest log-probability per row — shape [num_graphs].
pub fn predict<B: Backend>(log_probs: Tensor<B, 2>) -> Tensor<B, 1, Int> {
    // argmax(1) returns [n, 1]
    log_probs.argmax(1).flatten::<1>(0, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::domain::graph::Graph;

    type TestBackend = NdArray;

    #[test]
    fn test_log_probs_normalise() {
        let device = Default::default();
        let cfg    = GinClassifierConfig::new(GinEncoderConfig::sum_readout(1, 4, 2), 3);
        let model  = cfg.init::<TestBackend>(&device);
        let graphs = vec![
            Graph::new(2, 1, vec![1.0, 1.0], vec![(0, 1), (1, 0)], 0),
            Graph::new(3, 1, vec![1.0; 3], vec![], 2),
        ];
        let batch = GraphBatch::from_graphs(&graphs, &device);

        let log_probs = model.forward(&batch);
        assert_eq!(log_probs.dims(), [2, 3]);
        let row_sums: Vec<f32> = log_probs.exp().sum_dim(1).into_data().to_vec().unwrap();
        assert!(row_sums.iter().all(|s| (s - 1.0).abs() < 1e-5));
    }

    #[test]
    fn test_nll_picks_target_entries() {
        let device = Default::default();
        let log_probs = Tensor::<TestBackend, 2>::from_floats(
            [[-0.1, -2.0], [-3.0, -0.5]],
            &device,
        );
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([0, 1], &device);
        let loss: f32 = nll_loss(log_probs.clone(), targets).into_scalar();
        assert!((loss - 0.3).abs() < 1e-6);

        let pred: Vec<i64> = predict(log_probs).into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(pred, vec![0, 1]);
    }
}
