// ============================================================
// Layer 5 — GIN Encoder (stacked layers + readout)
// ============================================================
// L GIN layers applied in sequence. After every layer the node
// rows are pooled per graph, giving L pooled [G, dim] tensors:
//
//   x ─► layer 1 ─► h1 ─► layer 2 ─► h2 ... ─► hL
//          │               │                    │
//        pool            pool                 pool
//          ▼               ▼                    ▼
//        p1              p2                   pL
//
//   graph embedding = cat(p1 .. pL)   [G, L*dim]
//
// Two presets:
//   sum_readout   sum pooling, BatchNorm always on, eps fixed at 0
//   mean_readout  mean pooling, BatchNorm behind a flag, eps learned

use burn::{module::Ignored, prelude::*};

use crate::data::batcher::GraphBatch;
use crate::ml::layer::{GinLayer, GinLayerConfig};
use crate::ml::readout::{global_pool, Readout};

#[derive(Config, Debug)]
pub struct GinEncoderConfig {
    pub num_features: usize,
    pub hidden:       usize,
    pub num_layers:   usize,
    #[config(default = "Readout::Sum")]
    pub readout: Readout,
    #[config(default = true)]
    pub batch_norm: bool,
    #[config(default = false)]
    pub train_eps: bool,
}

impl GinEncoderConfig {
    pub fn sum_readout(num_features: usize, hidden: usize, num_layers: usize) -> Self {
        Self::new(num_features, hidden, num_layers)
    }

    pub fn mean_readout(num_features: usize, hidden: usize, num_layers: usize, batch_norm: bool) -> Self {
        Self::new(num_features, hidden, num_layers)
            .with_readout(Readout::Mean)
            .with_batch_norm(batch_norm)
            .with_train_eps(true)
    }

    /// Width of the graph embedding.
    pub fn embedding_dim(&self) -> usize {
        self.hidden * self.num_layers
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> GinEncoder<B> {
        let layers = (0..self.num_layers)
            .map(|i| {
                let d_input = if i == 0 { self.num_features } else { self.hidden };
                GinLayerConfig::new(d_input, self.hidden)
                    .with_train_eps(self.train_eps)
                    .with_batch_norm(self.batch_norm)
                    .init(device)
            })
            .collect();
        GinEncoder { layers, readout: Ignored(self.readout) }
    }
}

#[derive(Module, Debug)]
pub struct GinEncoder<B: Backend> {
    pub layers:  Vec<GinLayer<B>>,
    pub readout: Ignored<Readout>,
}

/// Everything one encoder pass produces.
pub struct EncoderOutput<B: Backend> {
    /// [num_graphs, L*dim]
    pub graph: Tensor<B, 2>,
    /// Pooled output of each layer, in layer order — each [num_graphs, dim]
    pub per_layer: Vec<Tensor<B, 2>>,
}

impl<B: Backend> GinEncoder<B> {
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn forward(&self, batch: &GraphBatch<B>) -> EncoderOutput<B> {
        let edges = batch.edges.as_ref();
        let mut x = batch.x.clone();
        let mut pooled_layers = Vec::with_capacity(self.layers.len());

        for layer in &self.layers {
            x = layer.forward(x, edges);
            pooled_layers.push(global_pool(
                x.clone(),
                batch.batch.clone(),
                &batch.node_counts,
                self.readout.0,
            ));
        }

        EncoderOutput {
            graph:     Tensor::cat(pooled_layers.clone(), 1),
            per_layer: pooled_layers,
        }
    }
}
