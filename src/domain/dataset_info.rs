// ============================================================
// Layer 3 — Dataset Info
// ============================================================
// Dataset-dependent sizes, computed ONCE after loading and passed
// explicitly to everything that needs them (model construction,
// logging). Nothing reads them from a global.

use serde::{Deserialize, Serialize};

use crate::domain::graph::Graph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub num_graphs:   usize,
    /// Node feature width the encoder's first layer expects
    pub num_features: usize,
    /// Number of distinct graph labels (labels are 0..num_classes)
    pub num_classes:  usize,
    /// True when the dataset had no node features and ones were substituted
    pub features_defaulted: bool,
}

impl DatasetInfo {
    /// Derive sizes from graphs whose features have already been filled in.
    pub fn from_graphs(graphs: &[Graph], features_defaulted: bool) -> Self {
        let num_features = graphs.first().map(|g| g.feature_dim).unwrap_or(1).max(1);
        let num_classes  = graphs.iter().map(|g| g.label + 1).max().unwrap_or(0);
        Self { num_graphs: graphs.len(), num_features, num_classes, features_defaulted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_from_graphs() {
        let graphs = vec![
            Graph::new(1, 3, vec![0.0; 3], vec![], 0),
            Graph::new(2, 3, vec![0.0; 6], vec![(0, 1)], 2),
        ];
        let info = DatasetInfo::from_graphs(&graphs, false);
        assert_eq!(info.num_graphs, 2);
        assert_eq!(info.num_features, 3);
        assert_eq!(info.num_classes, 3);
        assert!(!info.features_defaulted);
    }
}
