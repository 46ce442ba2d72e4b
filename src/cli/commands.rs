// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `cross-validate` and `embed`,
// and all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::cross_validation_use_case::{BackendKind, EncoderKind, ExperimentConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train and evaluate the GIN classifier with K-fold cross-validation
    CrossValidate(CrossValidateArgs),

    /// Extract graph embeddings from the GIN encoder as JSON
    Embed(EmbedArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum BackendArg {
    /// CPU (ndarray)
    Ndarray,
    /// GPU through wgpu
    Wgpu,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum EncoderArg {
    /// Sum readout, BatchNorm on every layer
    Sum,
    /// Mean readout, learned eps, BatchNorm with --batch-norm
    Mean,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug)]
pub struct ExperimentArgs {
    /// TU dataset name (e.g. MUTAG, PROTEINS, REDDIT-BINARY) or SYNTHETIC
    pub dataset: String,

    /// Directory holding <DATASET>/raw/<DATASET>_*.txt
    #[arg(long, default_value = "data")]
    pub data_root: String,

    /// Tensor backend
    #[arg(long, value_enum, default_value_t = BackendArg::Ndarray)]
    pub backend: BackendArg,

    /// Training epochs (cross-validate: 200 for REDDIT datasets, else 100; embed: 0)
    #[arg(long)]
    pub epochs: Option<usize>,

    /// Graphs per mini-batch
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 0.001)]
    pub lr: f64,

    /// Epoch from which the learning rate is multiplied by --lr-decay-factor
    #[arg(long, default_value_t = 51)]
    pub lr_decay_epoch: usize,

    #[arg(long, default_value_t = 0.5)]
    pub lr_decay_factor: f64,

    /// Hidden width of every GIN layer
    #[arg(long, default_value_t = 32)]
    pub hidden: usize,

    /// Number of stacked GIN layers
    #[arg(long, default_value_t = 5)]
    pub num_layers: usize,

    /// Dropout between the two classifier layers
    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    #[arg(long, value_enum, default_value_t = EncoderArg::Sum)]
    pub encoder: EncoderArg,

    /// Enable BatchNorm for the mean encoder (the sum encoder always uses it)
    #[arg(long)]
    pub batch_norm: bool,

    /// Prepend continuous node attributes to the one-hot node labels
    #[arg(long)]
    pub use_node_attr: bool,

    /// Number of graphs for the SYNTHETIC dataset
    #[arg(long, default_value_t = 200)]
    pub synthetic_graphs: usize,

    /// Number of classes for the SYNTHETIC dataset
    #[arg(long, default_value_t = 2)]
    pub synthetic_classes: usize,

    /// Seed shuffles and model initialisation; runs are not reproducible without it
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct CrossValidateArgs {
    #[command(flatten)]
    pub experiment: ExperimentArgs,

    /// Number of cross-validation folds
    #[arg(long, default_value_t = 10)]
    pub folds: usize,

    /// Fraction of the dataset to use, in (0, 1]
    #[arg(long, default_value_t = 1.0)]
    pub percentage: f64,

    /// Append per-epoch metrics to this CSV file
    #[arg(long)]
    pub metrics_csv: Option<String>,

    /// Exit right after the summary instead of waiting for Enter
    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Args, Debug)]
pub struct EmbedArgs {
    #[command(flatten)]
    pub experiment: ExperimentArgs,

    /// Write the JSON here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl From<BackendArg> for BackendKind {
    fn from(b: BackendArg) -> Self {
        match b {
            BackendArg::Ndarray => BackendKind::NdArray,
            BackendArg::Wgpu    => BackendKind::Wgpu,
        }
    }
}

impl From<EncoderArg> for EncoderKind {
    fn from(e: EncoderArg) -> Self {
        match e {
            EncoderArg::Sum  => EncoderKind::Sum,
            EncoderArg::Mean => EncoderKind::Mean,
        }
    }
}

/// Convert CLI args into the application-layer ExperimentConfig.
/// The application layer never sees clap types.
impl From<ExperimentArgs> for ExperimentConfig {
    fn from(a: ExperimentArgs) -> Self {
        let epochs = a.epochs.unwrap_or_else(|| ExperimentConfig::default_epochs(&a.dataset));
        ExperimentConfig {
            dataset:           a.dataset,
            data_root:         a.data_root,
            backend:           a.backend.into(),
            epochs,
            batch_size:        a.batch_size,
            lr:                a.lr,
            lr_decay_epoch:    a.lr_decay_epoch,
            lr_decay_factor:   a.lr_decay_factor,
            hidden:            a.hidden,
            num_layers:        a.num_layers,
            dropout:           a.dropout,
            encoder:           a.encoder.into(),
            batch_norm:        a.batch_norm,
            use_node_attr:     a.use_node_attr,
            synthetic_graphs:  a.synthetic_graphs,
            synthetic_classes: a.synthetic_classes,
            seed:              a.seed,
            ..ExperimentConfig::default()
        }
    }
}

impl From<CrossValidateArgs> for ExperimentConfig {
    fn from(a: CrossValidateArgs) -> Self {
        ExperimentConfig {
            folds:          a.folds,
            percentage:     a.percentage,
            metrics_csv:    a.metrics_csv,
            wait_for_input: !a.no_wait,
            ..a.experiment.into()
        }
    }
}

impl From<EmbedArgs> for ExperimentConfig {
    fn from(a: EmbedArgs) -> Self {
        // embed trains only when --epochs is given
        let epochs = a.experiment.epochs.unwrap_or(0);
        ExperimentConfig {
            epochs,
            wait_for_input: false,
            ..a.experiment.into()
        }
    }
}
