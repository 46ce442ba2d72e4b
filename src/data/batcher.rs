// ============================================================
// Layer 4 — Graph Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<Graph> into one
// disjoint-union graph the encoder can process in a single pass.
//
// How batching works here:
//   Input:  G graphs with n_1 .. n_G nodes
//   Output: one big graph with N = Σ n_g nodes
//
//   node features   stacked row-wise        → [N, F]
//   edges           shifted by node offset  → src [E], dst [E]
//   batch vector    graph id of every node  → [N]
//   labels          one per graph           → [G]
//
//   Example with two graphs (3 nodes, 2 nodes):
//     batch = [0, 0, 0, 1, 1]
//     edge (0 → 1) of graph 2 becomes (3 → 4)
//
// The batch vector is what readout uses to scatter node rows
// back into per-graph rows.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::graph::Graph;

// ─── EdgeIndex ────────────────────────────────────────────────────────────────
/// Directed edges of a batch as two parallel index tensors.
#[derive(Debug, Clone)]
pub struct EdgeIndex<B: Backend> {
    /// Message source node of every edge — shape: [num_edges]
    pub src: Tensor<B, 1, Int>,
    /// Message target node of every edge — shape: [num_edges]
    pub dst: Tensor<B, 1, Int>,
}

// ─── GraphBatch ───────────────────────────────────────────────────────────────
/// A mini-batch of graphs flattened into one disjoint union.
#[derive(Debug, Clone)]
pub struct GraphBatch<B: Backend> {
    /// Node features — shape: [num_nodes, num_features]
    pub x: Tensor<B, 2>,

    /// None when no graph in the batch has an edge
    pub edges: Option<EdgeIndex<B>>,

    /// Graph index of every node — shape: [num_nodes]
    pub batch: Tensor<B, 1, Int>,

    /// Node count per graph, kept on the host for mean pooling
    pub node_counts: Vec<usize>,

    /// Class labels — shape: [num_graphs]
    pub labels: Tensor<B, 1, Int>,

    pub num_graphs: usize,
}

impl<B: Backend> GraphBatch<B> {
    /// Build a batch directly from graphs whose features are present.
    pub fn from_graphs(graphs: &[Graph], device: &B::Device) -> Self {
        let num_graphs  = graphs.len();
        let dim         = graphs.first().map(|g| g.feature_dim).unwrap_or(1);
        let node_counts: Vec<usize> = graphs.iter().map(|g| g.num_nodes).collect();
        let num_nodes: usize = node_counts.iter().sum();

        let mut x_flat: Vec<f32>  = Vec::with_capacity(num_nodes * dim);
        let mut batch:  Vec<i32>  = Vec::with_capacity(num_nodes);
        let mut src:    Vec<i32>  = Vec::new();
        let mut dst:    Vec<i32>  = Vec::new();
        let mut offset = 0usize;

        for (g, graph) in graphs.iter().enumerate() {
            match &graph.features {
                Some(f) => x_flat.extend_from_slice(f),
                // featureless graphs reach the batcher only in tests
                None => x_flat.extend(std::iter::repeat(1.0).take(graph.num_nodes * dim)),
            }
            batch.extend(std::iter::repeat(g as i32).take(graph.num_nodes));
            for &(s, d) in &graph.edges {
                src.push((offset + s) as i32);
                dst.push((offset + d) as i32);
            }
            offset += graph.num_nodes;
        }

        let labels: Vec<i32> = graphs.iter().map(|g| g.label as i32).collect();

        let x = Tensor::<B, 2>::from_data(TensorData::new(x_flat, [num_nodes, dim]), device);

        let edges = (!src.is_empty()).then(|| EdgeIndex {
            src: Tensor::<B, 1, Int>::from_ints(src.as_slice(), device),
            dst: Tensor::<B, 1, Int>::from_ints(dst.as_slice(), device),
        });

        GraphBatch {
            x,
            edges,
            batch:  Tensor::<B, 1, Int>::from_ints(batch.as_slice(), device),
            node_counts,
            labels: Tensor::<B, 1, Int>::from_ints(labels.as_slice(), device),
            num_graphs,
        }
    }
}

// ─── GraphBatcher ─────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct GraphBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> GraphBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<Graph, GraphBatch<B>> for GraphBatcher<B> {
    fn batch(&self, items: Vec<Graph>) -> GraphBatch<B> {
        GraphBatch::from_graphs(&items, &self.device)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_disjoint_union_offsets_edges() {
        let device = Default::default();
        let graphs = vec![
            Graph::new(3, 1, vec![1.0, 2.0, 3.0], vec![(0, 1), (1, 2)], 0),
            Graph::new(2, 1, vec![4.0, 5.0], vec![(0, 1)], 1),
        ];
        let batch = GraphBatcher::<TestBackend>::new(device).batch(graphs);

        assert_eq!(batch.num_graphs, 2);
        assert_eq!(batch.x.dims(), [5, 1]);
        assert_eq!(batch.node_counts, vec![3, 2]);

        let assign: Vec<i64> = batch.batch.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(assign, vec![0, 0, 0, 1, 1]);

        let edges = batch.edges.unwrap();
        let src: Vec<i64> = edges.src.into_data().convert::<i64>().to_vec().unwrap();
        let dst: Vec<i64> = edges.dst.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(src, vec![0, 1, 3]);
        assert_eq!(dst, vec![1, 2, 4]);

        let labels: Vec<i64> = batch.labels.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(labels, vec![0, 1]);
    }

    #[test]
    fn test_edge_free_batch() {
        let device = Default::default();
        let graphs = vec![Graph::new(2, 1, vec![1.0, 1.0], vec![], 0)];
        let batch  = GraphBatch::<TestBackend>::from_graphs(&graphs, &device);
        assert!(batch.edges.is_none());
        assert_eq!(batch.x.dims(), [2, 1]);
    }
}
