// ============================================================
// Layer 3 — Graph Domain Type
// ============================================================
// One labelled graph from a graph-classification benchmark.
//
// Node features are stored row-major in a flat Vec:
//   features[i * feature_dim .. (i + 1) * feature_dim] = node i
//
// Edges use LOCAL node indices (0..num_nodes) and are directed:
// (src, dst) means a message flows from src into dst.
// Undirected datasets list both directions.
//
// A graph is immutable once loaded; the data layer builds
// new instances when it needs to fill in missing features.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// A single graph instance with an optional node feature matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Number of nodes in this graph
    pub num_nodes: usize,

    /// Width of each node's feature vector (0 when features are absent)
    pub feature_dim: usize,

    /// Row-major node features, or None when the dataset has none
    pub features: Option<Vec<f32>>,

    /// Directed edges as (source, target) local node indices
    pub edges: Vec<(usize, usize)>,

    /// Class label, already remapped into 0..num_classes
    pub label: usize,
}

impl Graph {
    /// Create a graph that carries node features.
    pub fn new(
        num_nodes:   usize,
        feature_dim: usize,
        features:    Vec<f32>,
        edges:       Vec<(usize, usize)>,
        label:       usize,
    ) -> Self {
        debug_assert_eq!(features.len(), num_nodes * feature_dim);
        Self { num_nodes, feature_dim, features: Some(features), edges, label }
    }

    /// Create a graph whose nodes have no features.
    pub fn featureless(num_nodes: usize, edges: Vec<(usize, usize)>, label: usize) -> Self {
        Self { num_nodes, feature_dim: 0, features: None, edges, label }
    }

    pub fn has_features(&self) -> bool {
        self.features.is_some()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Replace absent features with the constant feature 1.0 per node.
    pub fn with_default_features(self) -> Self {
        if self.features.is_some() {
            return self;
        }
        Self {
            feature_dim: 1,
            features:    Some(vec![1.0; self.num_nodes]),
            ..self
        }
    }

    /// Feature row of node `i`, or None when features are absent.
    pub fn feature_row(&self, i: usize) -> Option<&[f32]> {
        let dim = self.feature_dim;
        self.features.as_ref().map(|f| &f[i * dim..(i + 1) * dim])
    }

    /// Mean of all node feature rows. Empty graphs average to zeros.
    pub fn mean_features(&self) -> Vec<f32> {
        let mut mean = vec![0.0f32; self.feature_dim];
        if self.features.is_none() || self.num_nodes == 0 {
            return mean;
        }
        for row in (0..self.num_nodes).filter_map(|i| self.feature_row(i)) {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        let n = self.num_nodes as f32;
        mean.iter_mut().for_each(|m| *m /= n);
        mean
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_features_are_ones() {
        let g = Graph::featureless(3, vec![(0, 1), (1, 0)], 1).with_default_features();
        assert_eq!(g.feature_dim, 1);
        assert_eq!(g.features, Some(vec![1.0, 1.0, 1.0]));
        assert_eq!(g.label, 1);
    }

    #[test]
    fn test_default_features_keep_existing() {
        let g = Graph::new(2, 2, vec![1.0, 0.0, 0.0, 1.0], vec![], 0);
        let filled = g.clone().with_default_features();
        assert_eq!(g, filled);
    }

    #[test]
    fn test_feature_row_and_mean() {
        let g = Graph::new(2, 2, vec![1.0, 2.0, 3.0, 6.0], vec![(0, 1)], 0);
        assert_eq!(g.feature_row(1), Some(&[3.0, 6.0][..]));
        assert_eq!(g.mean_features(), vec![2.0, 4.0]);
    }
}
