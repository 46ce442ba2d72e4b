// ============================================================
// Layer 5 — GIN Message-Passing Layer
// ============================================================
// One round of Graph Isomorphism Network message passing:
//
//   agg_i = Σ_{j → i} x_j                       (sum over in-edges)
//   h_i   = MLP((1 + eps) · x_i + agg_i)
//   out_i = BatchNorm(ReLU(h_i))                (norm optional)
//
//   MLP = Linear(d_in, d_hidden) → ReLU → Linear(d_hidden, d_hidden)
//
// eps is either fixed at 0 or a learned scalar starting at 0.
// Nodes without in-edges aggregate to zero and reduce to MLP(x_i).
// The output always has one row per input node.
//
// Reference: Xu et al. (2019) How Powerful are Graph Neural Networks?
//            Burn Book §3 (Building Blocks)

use burn::{
    module::Param,
    nn::{BatchNorm, BatchNormConfig, Linear, LinearConfig},
    prelude::*,
    tensor::activation::relu,
};

use crate::data::batcher::EdgeIndex;

#[derive(Config, Debug)]
pub struct GinLayerConfig {
    pub d_input:  usize,
    pub d_hidden: usize,
    /// Learn eps instead of fixing it at 0
    #[config(default = false)]
    pub train_eps: bool,
    /// Apply BatchNorm after the output ReLU
    #[config(default = true)]
    pub batch_norm: bool,
}

impl GinLayerConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> GinLayer<B> {
        let mlp_in  = LinearConfig::new(self.d_input, self.d_hidden).init(device);
        let mlp_out = LinearConfig::new(self.d_hidden, self.d_hidden).init(device);
        let eps  = self.train_eps
            .then(|| Param::from_tensor(Tensor::zeros([1], device)));
        let norm = self.batch_norm
            .then(|| BatchNormConfig::new(self.d_hidden).init(device));
        GinLayer { mlp_in, mlp_out, eps, norm }
    }
}

#[derive(Module, Debug)]
pub struct GinLayer<B: Backend> {
    pub mlp_in:  Linear<B>,
    pub mlp_out: Linear<B>,
    pub eps:     Option<Param<Tensor<B, 1>>>,
    pub norm:    Option<BatchNorm<B, 0>>,
}

impl<B: Backend> GinLayer<B> {
    /// x: [num_nodes, d_input] → [num_nodes, d_hidden]
    pub fn forward(&self, x: Tensor<B, 2>, edges: Option<&EdgeIndex<B>>) -> Tensor<B, 2> {
        let agg = neighbour_sum(x.clone(), edges);

        let centre = match &self.eps {
            Some(eps) => x * eps.val().add_scalar(1.0).reshape([1, 1]),
            None      => x,
        };

        let h = self.mlp_out.forward(relu(self.mlp_in.forward(centre + agg)));
        let h = relu(h);
        match &self.norm {
            Some(norm) => norm.forward(h),
            None       => h,
        }
    }
}

/// Sum of in-neighbour features per node; zeros when there are no edges.
pub fn neighbour_sum<B: Backend>(x: Tensor<B, 2>, edges: Option<&EdgeIndex<B>>) -> Tensor<B, 2> {
    match edges {
        None => x.zeros_like(),
        Some(e) => {
            let messages = x.clone().select(0, e.src.clone());
            x.zeros_like().select_assign(0, e.dst.clone(), messages)
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    use crate::data::batcher::GraphBatch;
    use crate::domain::graph::Graph;

    type TestBackend = NdArray;

    fn batch_of(graphs: &[Graph]) -> GraphBatch<TestBackend> {
        GraphBatch::from_graphs(graphs, &Default::default())
    }

    #[test]
    fn test_neighbour_sum_follows_edge_direction() {
        // 0 → 2, 1 → 2, 2 → 0
        let g = Graph::new(3, 1, vec![1.0, 2.0, 4.0], vec![(0, 2), (1, 2), (2, 0)], 0);
        let b = batch_of(&[g]);
        let agg: Vec<f32> = neighbour_sum(b.x, b.edges.as_ref()).into_data().to_vec().unwrap();
        assert_eq!(agg, vec![4.0, 0.0, 3.0]);
    }

    #[test]
    fn test_output_has_one_row_per_node() {
        let device = Default::default();
        let layer  = GinLayerConfig::new(3, 8).init::<TestBackend>(&device);
        let g = Graph::new(5, 3, vec![0.5; 15], vec![(0, 1), (1, 0), (3, 4)], 0);
        let b = batch_of(&[g]);
        assert_eq!(layer.forward(b.x, b.edges.as_ref()).dims(), [5, 8]);
    }

    #[test]
    fn test_zero_edge_graph_keeps_row_count() {
        let device = Default::default();
        let layer  = GinLayerConfig::new(1, 4).with_batch_norm(false).init::<TestBackend>(&device);
        let g = Graph::new(4, 1, vec![1.0; 4], vec![], 0);
        let b = batch_of(&[g]);
        assert!(b.edges.is_none());
        assert_eq!(layer.forward(b.x, None).dims(), [4, 4]);
    }

    #[test]
    fn test_isolated_node_reduces_to_self_transform() {
        let device = Default::default();
        let layer  = GinLayerConfig::new(2, 4).with_batch_norm(false).init::<TestBackend>(&device);

        // node 2 is isolated; its output must match a graph containing only it
        let with_edges = Graph::new(3, 2, vec![1.0, 0.0, 0.0, 1.0, 0.3, 0.7], vec![(0, 1), (1, 0)], 0);
        let alone      = Graph::new(1, 2, vec![0.3, 0.7], vec![], 0);

        let b1 = batch_of(&[with_edges]);
        let b2 = batch_of(&[alone]);
        let out1 = layer.forward(b1.x, b1.edges.as_ref()).slice([2..3, 0..4]);
        let out2 = layer.forward(b2.x, None);

        let v1: Vec<f32> = out1.into_data().to_vec().unwrap();
        let v2: Vec<f32> = out2.into_data().to_vec().unwrap();
        for (a, b) in v1.iter().zip(&v2) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_learned_eps_receives_gradient() {
        type Ad = Autodiff<NdArray>;
        let device = Default::default();
        let layer  = GinLayerConfig::new(1, 2)
            .with_train_eps(true)
            .with_batch_norm(false)
            .init::<Ad>(&device);
        let g = Graph::new(2, 1, vec![1.0, 2.0], vec![(0, 1)], 0);
        let b = GraphBatch::<Ad>::from_graphs(&[g], &device);

        let grads = layer.forward(b.x, b.edges.as_ref()).sum().backward();
        let eps   = layer.eps.as_ref().unwrap();
        assert!(eps.val().grad(&grads).is_some());
    }
}
