use anyhow::{bail, Result};
use burn::data::dataset::Dataset;

use crate::domain::dataset_info::DatasetInfo;
use crate::domain::graph::Graph;

/// Fill in absent node features with ones and check every graph
/// has the same feature width. Returns the graphs and their sizes.
pub fn prepare_graphs(graphs: Vec<Graph>) -> Result<(Vec<Graph>, DatasetInfo)> {
    if graphs.is_empty() {
        bail!("Dataset contains no graphs");
    }

    let defaulted = graphs.iter().any(|g| !g.has_features());
    if defaulted && graphs.iter().any(Graph::has_features) {
        bail!("Some graphs carry node features and some do not");
    }
    if defaulted {
        tracing::warn!("Dataset has no node features, using the constant feature 1.0 per node");
    }

    let graphs: Vec<Graph> = graphs.into_iter().map(Graph::with_default_features).collect();
    let dim = graphs[0].feature_dim;
    if let Some(g) = graphs.iter().position(|g| g.feature_dim != dim) {
        bail!("Graph {} has feature width {}, expected {}", g, graphs[g].feature_dim, dim);
    }

    let info = DatasetInfo::from_graphs(&graphs, defaulted);
    Ok((graphs, info))
}

/// In-memory graph dataset served to Burn's DataLoader.
#[derive(Debug, Clone)]
pub struct GraphDataset {
    graphs: Vec<Graph>,
}

impl GraphDataset {
    pub fn new(graphs: Vec<Graph>) -> Self { Self { graphs } }

    /// Dataset made of the graphs at `indices`, in that order.
    pub fn subset(graphs: &[Graph], indices: &[usize]) -> Self {
        Self { graphs: indices.iter().map(|&i| graphs[i].clone()).collect() }
    }

}

impl Dataset<Graph> for GraphDataset {
    fn get(&self, index: usize) -> Option<Graph> {
        self.graphs.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.graphs.len()
    }
}
