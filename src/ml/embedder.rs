// ============================================================
// Layer 5 — Embedding Extraction
// ============================================================
// Runs a (frozen) encoder over a whole dataset and collects:
//
//   embeddings   [num_graphs][L*dim]   graph-level encoder output
//   labels       [num_graphs]
//   ib.inputs    [num_graphs][F]       mean of the raw node features
//   ib.layers    [L][num_graphs][dim]  pooled output of every layer
//
// The `ib` block feeds information-plane style analysis: the mutual
// information between inputs, labels and each layer's representation.
// Graphs keep the order of the input slice.

use anyhow::{anyhow, Result};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::graph::Graph;
use crate::ml::encoder::GinEncoder;
use crate::ml::trainer::build_loader;
use crate::data::dataset::GraphDataset;

/// Per-layer representations for information-bottleneck analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InformationPlane {
    pub inputs: Vec<Vec<f32>>,
    pub labels: Vec<usize>,
    /// layers[l][g] = pooled output of layer l for graph g
    pub layers: Vec<Vec<Vec<f32>>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphEmbeddings {
    pub embeddings: Vec<Vec<f32>>,
    pub labels:     Vec<usize>,
    pub ib:         InformationPlane,
}

/// Encode every graph in `graphs`, `batch_size` graphs at a time.
/// Call on a non-autodiff encoder (e.g. `model.valid().encoder`).
pub fn extract_embeddings<B: Backend>(
    encoder:    &GinEncoder<B>,
    graphs:     &[Graph],
    batch_size: usize,
    device:     &B::Device,
) -> Result<GraphEmbeddings> {
    let mut out = GraphEmbeddings {
        ib: InformationPlane {
            layers: vec![Vec::new(); encoder.num_layers()],
            ..Default::default()
        },
        ..Default::default()
    };

    let loader = build_loader::<B>(GraphDataset::new(graphs.to_vec()), batch_size, device);
    for batch in loader.iter() {
        let output = encoder.forward(&batch);
        out.embeddings.extend(rows(output.graph)?);
        for (layer, pooled) in out.ib.layers.iter_mut().zip(output.per_layer) {
            layer.extend(rows(pooled)?);
        }
    }

    out.labels    = graphs.iter().map(|g| g.label).collect();
    out.ib.labels = out.labels.clone();
    out.ib.inputs = graphs.iter().map(Graph::mean_features).collect();

    tracing::info!(
        "Extracted {} embeddings of width {}",
        out.embeddings.len(),
        out.embeddings.first().map(Vec::len).unwrap_or(0)
    );
    Ok(out)
}

/// [rows, cols] tensor → Vec of rows.
fn rows<B: Backend>(t: Tensor<B, 2>) -> Result<Vec<Vec<f32>>> {
    let [_, cols] = t.dims();
    let flat: Vec<f32> = t
        .into_data()
        .convert::<f32>()
        .to_vec()
        .map_err(|e| anyhow!("Cannot read embedding tensor: {e:?}"))?;
    Ok(flat.chunks(cols.max(1)).map(<[f32]>::to_vec).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::data::{dataset::prepare_graphs, synthetic::SyntheticGraphs};
    use crate::domain::traits::GraphSource;
    use crate::ml::encoder::GinEncoderConfig;

    type TestBackend = NdArray;

    #[test]
    fn test_shapes_and_order() {
        let device = Default::default();
        let (graphs, info) = prepare_graphs(SyntheticGraphs::new(7, 2).load_all().unwrap()).unwrap();
        let encoder = GinEncoderConfig::mean_readout(info.num_features, 4, 3, true)
            .init::<TestBackend>(&device);

        let emb = extract_embeddings(&encoder, &graphs, 3, &device).unwrap();
        assert_eq!(emb.embeddings.len(), 7);
        assert!(emb.embeddings.iter().all(|e| e.len() == 12));
        assert_eq!(emb.labels, vec![0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(emb.ib.layers.len(), 3);
        assert!(emb.ib.layers.iter().all(|l| l.len() == 7 && l[0].len() == 4));
        assert_eq!(emb.ib.inputs, vec![vec![1.0]; 7]);

        // the graph embedding is the concatenation of the per-layer vectors
        let concat: Vec<f32> = emb.ib.layers.iter().flat_map(|l| l[5].clone()).collect();
        assert_eq!(concat, emb.embeddings[5]);
    }
}
