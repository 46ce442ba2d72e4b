// ============================================================
// Layer 2 — CrossValidationUseCase
// ============================================================
// Orchestrates one K-fold cross-validation run:
//
//   Step 1: Load graphs                (Layer 4 - data)
//   Step 2: Fill features, sizes       (Layer 4 - data)
//   Step 3: Keep `percentage`, shuffle (Layer 4 - data)
//   Step 4: Split into K folds         (Layer 4 - data)
//   Step 5: Per fold: fresh model,     (Layer 5 - ml)
//           train + evaluate per epoch
//   Step 6: Record (epoch, fold) test  (Layer 3 - domain)
//           accuracies, optional CSV   (Layer 6 - infra)
//   Step 7: Best mean epoch ± std      (Layer 3 - domain)
//
// Folds run one after another; nothing but the accuracy table
// survives from one fold to the next.

use anyhow::{bail, Context, Result};
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::{prepare_graphs, GraphDataset},
    splitter::{take_fraction, KFold},
    synthetic::SyntheticGraphs,
    tu_loader::TuDatasetLoader,
};
use crate::domain::{
    accuracy::{AccuracySummary, AccuracyTable},
    dataset_info::DatasetInfo,
    graph::Graph,
    traits::GraphSource,
};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::{
    classifier::GinClassifierConfig,
    encoder::GinEncoderConfig,
    trainer::{train_fold, LrSchedule},
};

/// Dataset name that selects the built-in synthetic generator.
pub const SYNTHETIC_DATASET: &str = "SYNTHETIC";

// ─── Configuration ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    NdArray,
    Wgpu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncoderKind {
    /// Sum readout, BatchNorm always on, fixed eps
    Sum,
    /// Mean readout, BatchNorm behind `batch_norm`, learned eps
    Mean,
}

/// All settings of one experiment run, fixed at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub dataset:         String,
    pub data_root:       String,
    pub backend:         BackendKind,
    pub percentage:      f64,
    pub epochs:          usize,
    pub folds:           usize,
    pub batch_size:      usize,
    pub lr:              f64,
    pub lr_decay_epoch:  usize,
    pub lr_decay_factor: f64,
    pub hidden:          usize,
    pub num_layers:      usize,
    pub dropout:         f64,
    pub encoder:         EncoderKind,
    pub batch_norm:      bool,
    pub use_node_attr:   bool,
    pub synthetic_graphs:  usize,
    pub synthetic_classes: usize,
    pub seed:            Option<u64>,
    pub wait_for_input:  bool,
    pub metrics_csv:     Option<String>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            dataset:         "MUTAG".to_string(),
            data_root:       "data".to_string(),
            backend:         BackendKind::NdArray,
            percentage:      1.0,
            epochs:          100,
            folds:           10,
            batch_size:      128,
            lr:              0.001,
            lr_decay_epoch:  51,
            lr_decay_factor: 0.5,
            hidden:          32,
            num_layers:      5,
            dropout:         0.5,
            encoder:         EncoderKind::Sum,
            batch_norm:      false,
            use_node_attr:   false,
            synthetic_graphs:  200,
            synthetic_classes: 2,
            seed:            None,
            wait_for_input:  true,
            metrics_csv:     None,
        }
    }
}

impl ExperimentConfig {
    /// REDDIT datasets train for 200 epochs, everything else for 100.
    pub fn default_epochs(dataset: &str) -> usize {
        if dataset.contains("REDDIT") { 200 } else { 100 }
    }

    pub fn lr_schedule(&self) -> LrSchedule {
        LrSchedule {
            base_lr:     self.lr,
            decay_epoch: self.lr_decay_epoch,
            factor:      self.lr_decay_factor,
        }
    }

    pub fn encoder_config(&self, info: &DatasetInfo) -> GinEncoderConfig {
        match self.encoder {
            EncoderKind::Sum  => GinEncoderConfig::sum_readout(info.num_features, self.hidden, self.num_layers),
            EncoderKind::Mean => GinEncoderConfig::mean_readout(
                info.num_features, self.hidden, self.num_layers, self.batch_norm,
            ),
        }
    }

    pub fn model_config(&self, info: &DatasetInfo) -> GinClassifierConfig {
        GinClassifierConfig::new(self.encoder_config(info), info.num_classes)
            .with_dropout(self.dropout)
    }

    pub fn validate(&self) -> Result<()> {
        if self.folds < 2 {
            bail!("--folds must be at least 2, got {}", self.folds);
        }
        if self.batch_size == 0 {
            bail!("--batch-size must be positive");
        }
        if self.num_layers == 0 || self.hidden == 0 {
            bail!("--num-layers and --hidden must be positive");
        }
        if !(self.percentage > 0.0 && self.percentage <= 1.0) {
            bail!("--percentage must be in (0, 1], got {}", self.percentage);
        }
        if !(0.0..1.0).contains(&self.dropout) {
            bail!("--dropout must be in [0, 1), got {}", self.dropout);
        }
        Ok(())
    }

    fn source(&self) -> Box<dyn GraphSource> {
        if self.dataset.eq_ignore_ascii_case(SYNTHETIC_DATASET) {
            let mut synthetic = SyntheticGraphs::new(self.synthetic_graphs, self.synthetic_classes);
            if let Some(seed) = self.seed {
                synthetic = synthetic.with_seed(seed);
            }
            Box::new(synthetic)
        } else {
            Box::new(
                TuDatasetLoader::new(&self.data_root, &self.dataset)
                    .with_node_attributes(self.use_node_attr),
            )
        }
    }
}

/// Load the configured dataset and fill in absent node features.
pub fn load_graphs(cfg: &ExperimentConfig) -> Result<(Vec<Graph>, DatasetInfo)> {
    let source = cfg.source();
    let graphs = source
        .load_all()
        .with_context(|| format!("Failed to load dataset '{}'", source.name()))?;
    let (graphs, info) = prepare_graphs(graphs)?;
    tracing::info!(
        "Dataset '{}': {} graphs, {} features{}, {} classes",
        source.name(),
        info.num_graphs,
        info.num_features,
        if info.features_defaulted { " (defaulted)" } else { "" },
        info.num_classes
    );
    Ok((graphs, info))
}

// ─── Report ───────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct CrossValidationReport {
    pub dataset:    String,
    pub percentage: f64,
    pub info:       DatasetInfo,
    pub table:      AccuracyTable,
    pub summary:    AccuracySummary,
}

impl CrossValidationReport {
    /// `<percentage> <dataset> <best epoch> <best mean> <std>`
    pub fn summary_line(&self) -> String {
        format!(
            "{:?} {} {} {} {}",
            self.percentage,
            self.dataset,
            self.summary.best_epoch,
            self.summary.best_mean,
            self.summary.best_std,
        )
    }
}

// ─── CrossValidationUseCase ───────────────────────────────────────────────────
pub struct CrossValidationUseCase {
    config: ExperimentConfig,
}

impl CrossValidationUseCase {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<CrossValidationReport> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Steps 1-2: load and prepare ───────────────────────────────────────
        let (graphs, info) = load_graphs(cfg)?;
        println!("Number of graphs {}", graphs.len());

        // ── Step 3: fraction + shuffle ────────────────────────────────────────
        let graphs = take_fraction(graphs, cfg.percentage, cfg.seed)?;

        // ── Step 4: folds ─────────────────────────────────────────────────────
        let folds = KFold::new(cfg.folds).with_shuffle(true).with_seed(cfg.seed).split(graphs.len())?;

        // ── Steps 5-6: train every fold on the chosen backend ─────────────────
        let table = match cfg.backend {
            BackendKind::NdArray => self.run_folds::<burn::backend::Autodiff<burn::backend::NdArray>>(
                &graphs, &info, &folds, &Default::default(),
            )?,
            BackendKind::Wgpu => {
                let device = burn::backend::wgpu::WgpuDevice::default();
                tracing::info!("Using WGPU device: {:?}", device);
                self.run_folds::<burn::backend::Autodiff<burn::backend::Wgpu>>(
                    &graphs, &info, &folds, &device,
                )?
            }
        };

        // ── Step 7: reduce ────────────────────────────────────────────────────
        let summary = table
            .summary()
            .context("No epochs were recorded; is --epochs 0?")?;
        tracing::info!(
            "Best epoch {} with mean test accuracy {:.4} ± {:.4}",
            summary.best_epoch, summary.best_mean, summary.best_std
        );

        Ok(CrossValidationReport {
            dataset:    cfg.dataset.clone(),
            percentage: cfg.percentage,
            info,
            table,
            summary,
        })
    }

    fn run_folds<B: AutodiffBackend>(
        &self,
        graphs: &[Graph],
        info:   &DatasetInfo,
        folds:  &[crate::data::splitter::Fold],
        device: &B::Device,
    ) -> Result<AccuracyTable> {
        let cfg       = &self.config;
        let model_cfg = cfg.model_config(info);
        let logger    = cfg.metrics_csv.as_deref().map(MetricsLogger::new).transpose()?;
        let mut table = AccuracyTable::new(cfg.epochs);

        for (k, fold) in folds.iter().enumerate() {
            let fold_no = k + 1;
            let train = GraphDataset::subset(graphs, &fold.train);
            let test  = GraphDataset::subset(graphs, &fold.test);
            println!("len(train_dataset) {}", fold.train.len());
            println!("len(test_dataset) {}", fold.test.len());

            train_fold::<B>(cfg, &model_cfg, fold_no, train, Some(test), device, &mut |m: &EpochMetrics| {
                table.record(m.epoch, m.test_acc)?;
                println!("{}", m.progress_line());
                if let Some(logger) = &logger {
                    logger.log(m)?;
                }
                Ok(())
            })?;
        }

        Ok(table)
    }
}
