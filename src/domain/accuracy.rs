// ============================================================
// Layer 3 — Accuracy Table
// ============================================================
// Test accuracy per (epoch, fold), filled in as cross-validation
// runs and reduced once at the end:
//
//   mean[e]   = average over folds of acc[e][f]
//   best      = first epoch with the highest mean
//   std       = population standard deviation of acc[best][..]
//
// Epochs are 1-based at the API boundary to match the progress
// lines printed during training.

use anyhow::{bail, Result};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct AccuracyTable {
    /// rows[epoch - 1] holds one entry per completed fold
    rows: Vec<Vec<f64>>,
}

/// Reduction of a finished table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccuracySummary {
    /// 1-based epoch with the highest mean test accuracy
    pub best_epoch: usize,
    pub best_mean:  f64,
    pub best_std:   f64,
}

impl AccuracyTable {
    pub fn new(epochs: usize) -> Self {
        Self { rows: vec![Vec::new(); epochs] }
    }

    /// Append the accuracy for `epoch` (1-based) of the current fold.
    pub fn record(&mut self, epoch: usize, accuracy: f64) -> Result<()> {
        let Some(row) = epoch.checked_sub(1).and_then(|i| self.rows.get_mut(i)) else {
            bail!("epoch {epoch} outside 1..={}", self.rows.len());
        };
        row.push(accuracy);
        Ok(())
    }

    /// Accuracies recorded for `epoch` (1-based), one per fold.
    /// Empty for epochs outside the table.
    pub fn epoch(&self, epoch: usize) -> &[f64] {
        epoch
            .checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Mean across folds for every epoch.
    pub fn epoch_means(&self) -> Vec<f64> {
        self.rows.iter().map(|r| mean(r)).collect()
    }

    /// None when no epoch has any recorded fold.
    pub fn summary(&self) -> Option<AccuracySummary> {
        let means = self.epoch_means();
        let mut best: Option<(usize, f64)> = None;
        for (i, m) in means.iter().enumerate() {
            if self.rows[i].is_empty() {
                continue;
            }
            // strict comparison keeps the earliest epoch on ties
            if best.map_or(true, |(_, b)| *m > b) {
                best = Some((i, *m));
            }
        }
        best.map(|(i, best_mean)| AccuracySummary {
            best_epoch: i + 1,
            best_mean,
            best_std:   population_std(self.epoch(i + 1)),
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_picks_best_mean_epoch() {
        let mut t = AccuracyTable::new(3);
        // fold 1
        t.record(1, 0.5).unwrap();
        t.record(2, 0.9).unwrap();
        t.record(3, 0.7).unwrap();
        // fold 2
        t.record(1, 0.5).unwrap();
        t.record(2, 0.7).unwrap();
        t.record(3, 0.7).unwrap();

        let s = t.summary().unwrap();
        assert_eq!(s.best_epoch, 2);
        assert!((s.best_mean - 0.8).abs() < 1e-12);
        assert!((s.best_std - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_ties_keep_first_epoch() {
        let mut t = AccuracyTable::new(2);
        t.record(1, 0.6).unwrap();
        t.record(2, 0.6).unwrap();
        assert_eq!(t.summary().unwrap().best_epoch, 1);
    }

    #[test]
    fn test_empty_table_has_no_summary() {
        assert!(AccuracyTable::new(4).summary().is_none());
    }

    #[test]
    fn test_out_of_range_epochs_rejected() {
        let mut t = AccuracyTable::new(2);
        assert!(t.record(0, 1.0).is_err());
        assert!(t.record(3, 1.0).is_err());
        assert!(t.summary().is_none());
        assert!(t.epoch(0).is_empty());
        assert!(t.epoch(3).is_empty());
    }
}
