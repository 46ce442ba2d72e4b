// ============================================================
// Layer 2 — EmbedUseCase
// ============================================================
// Produces fixed-size graph embeddings for downstream analysis:
//
//   Step 1: Load + prepare graphs           (Layer 4 - data)
//   Step 2: Build the classifier; train it  (Layer 5 - ml)
//           on every graph for `epochs`
//           epochs (0 keeps the random init)
//   Step 3: Freeze, run the encoder alone   (Layer 5 - ml)
//   Step 4: Write JSON                      (Layer 6 - infra)

use anyhow::Result;
use burn::{module::AutodiffModule, tensor::backend::AutodiffBackend};
use std::path::PathBuf;

use crate::application::cross_validation_use_case::{load_graphs, BackendKind, ExperimentConfig};
use crate::data::dataset::GraphDataset;
use crate::domain::{dataset_info::DatasetInfo, graph::Graph};
use crate::infra::{embedding_store::write_json, metrics::EpochMetrics};
use crate::ml::{
    embedder::{extract_embeddings, GraphEmbeddings},
    trainer::train_fold,
};

pub struct EmbedUseCase {
    config: ExperimentConfig,
    output: Option<PathBuf>,
}

impl EmbedUseCase {
    pub fn new(config: ExperimentConfig, output: Option<PathBuf>) -> Self {
        Self { config, output }
    }

    pub fn execute(&self) -> Result<GraphEmbeddings> {
        let cfg = &self.config;
        cfg.validate()?;

        let (graphs, info) = load_graphs(cfg)?;

        let embeddings = match cfg.backend {
            BackendKind::NdArray => self.embed::<burn::backend::Autodiff<burn::backend::NdArray>>(
                &graphs, &info, &Default::default(),
            )?,
            BackendKind::Wgpu => self.embed::<burn::backend::Autodiff<burn::backend::Wgpu>>(
                &graphs, &info, &burn::backend::wgpu::WgpuDevice::default(),
            )?,
        };

        write_json(&embeddings, self.output.as_deref())?;
        Ok(embeddings)
    }

    fn embed<B: AutodiffBackend>(
        &self,
        graphs: &[Graph],
        info:   &DatasetInfo,
        device: &B::Device,
    ) -> Result<GraphEmbeddings> {
        let cfg   = &self.config;
        let train = GraphDataset::new(graphs.to_vec());

        let model = train_fold::<B>(cfg, &cfg.model_config(info), 1, train, None, device, &mut |m: &EpochMetrics| {
            tracing::info!(
                "Epoch {:03}: train loss {:.7}, train acc {:.7}",
                m.epoch, m.train_loss, m.train_acc
            );
            Ok(())
        })?;

        let encoder = model.valid().encoder;
        extract_embeddings(&encoder, graphs, cfg.batch_size, device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cross_validation_use_case::{EncoderKind, SYNTHETIC_DATASET};

    #[test]
    fn test_embeds_every_graph() {
        let tmp  = tempfile::tempdir().unwrap();
        let path = tmp.path().join("emb.json");
        let cfg  = ExperimentConfig {
            dataset:           SYNTHETIC_DATASET.to_string(),
            synthetic_graphs:  9,
            synthetic_classes: 3,
            epochs:            1,
            batch_size:        4,
            hidden:            6,
            num_layers:        2,
            encoder:           EncoderKind::Mean,
            seed:              Some(5),
            ..Default::default()
        };

        let emb = EmbedUseCase::new(cfg, Some(path.clone())).execute().unwrap();
        assert_eq!(emb.embeddings.len(), 9);
        assert!(emb.embeddings.iter().all(|e| e.len() == 12));
        assert_eq!(emb.ib.layers.len(), 2);

        let back: GraphEmbeddings =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.labels, emb.labels);
    }
}
