// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Optionally records every (fold, epoch) to a CSV file so learning
// curves can be plotted after a cross-validation run.
//
// Example CSV output:
//   fold,epoch,train_loss,train_acc,test_acc
//   1,1,0.693147,0.500000,0.500000
//   1,2,0.612380,0.650000,0.600000
//   ...
//
// The header is written only when the file is new, so repeated
// runs append to the same log.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

/// One epoch of one fold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// 1-based fold number
    pub fold: usize,

    /// 1-based epoch number
    pub epoch: usize,

    /// Graph-weighted mean NLL over the training set
    pub train_loss: f64,

    /// Fraction of training graphs classified correctly, in [0, 1]
    pub train_acc: f64,

    /// Fraction of held-out graphs classified correctly, in [0, 1]
    pub test_acc: f64,
}

impl EpochMetrics {
    /// The progress line printed after every epoch.
    pub fn progress_line(&self) -> String {
        format!(
            "Epoch: {:03}, Train Loss: {:.7}, Train Acc: {:.7}, Test Acc: {:.7}",
            self.epoch, self.train_loss, self.train_acc, self.test_acc,
        )
    }
}

/// Appends epoch metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the logger, writing the header if the file doesn't exist yet.
    pub fn new(csv_path: impl AsRef<Path>) -> Result<Self> {
        let csv_path = csv_path.as_ref().to_path_buf();

        if let Some(dir) = csv_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create '{}'", dir.display()))?;
        }

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "fold,epoch,train_loss,train_acc,test_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{},{:.6},{:.6},{:.6}",
            m.fold, m.epoch, m.train_loss, m.train_acc, m.test_acc,
        )?;
        Ok(())
    }
}
