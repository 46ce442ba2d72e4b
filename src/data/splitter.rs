// ============================================================
// Layer 4 — K-Fold Splitter
// ============================================================
// Partitions dataset indices into K (train, test) folds.
//
// Layout (same as scikit-learn's KFold):
//   1. optionally shuffle the indices 0..n
//   2. cut them into K contiguous test blocks; the first n % K
//      blocks get one extra element
//   3. each fold trains on everything outside its test block
//
// Invariants per fold:  train ∩ test = ∅,  train ∪ test = 0..n
// Across one pass:      every index is in exactly one test block
//
// Without a seed the shuffle draws from thread_rng(), so two runs
// produce different folds.
//
// Reference: rand crate documentation (SliceRandom)

use anyhow::{bail, Result};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// One cross-validation fold as index lists into the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test:  Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct KFold {
    n_splits: usize,
    shuffle:  bool,
    seed:     Option<u64>,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits, shuffle: false, seed: None }
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Split `n` items into `n_splits` folds.
    pub fn split(&self, n: usize) -> Result<Vec<Fold>> {
        if self.n_splits < 2 {
            bail!("Need at least 2 folds, got {}", self.n_splits);
        }
        if self.n_splits > n {
            bail!("Cannot split {} graphs into {} folds", n, self.n_splits);
        }

        let mut indices: Vec<usize> = (0..n).collect();
        if self.shuffle {
            shuffle_with(&mut indices, self.seed);
        }

        let base  = n / self.n_splits;
        let extra = n % self.n_splits;

        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0usize;
        for k in 0..self.n_splits {
            let size = base + usize::from(k < extra);
            let end  = start + size;
            let test = indices[start..end].to_vec();
            let train = indices[..start]
                .iter()
                .chain(&indices[end..])
                .copied()
                .collect();
            folds.push(Fold { train, test });
            start = end;
        }

        tracing::debug!(
            "K-fold split: {} items into {} folds ({}..={} test items each)",
            n, self.n_splits, base, base + usize::from(extra > 0)
        );
        Ok(folds)
    }
}

/// Shuffle in place, seeded when a seed is given.
pub fn shuffle_with<T>(items: &mut [T], seed: Option<u64>) {
    match seed {
        Some(s) => items.shuffle(&mut StdRng::seed_from_u64(s)),
        None    => items.shuffle(&mut rand::thread_rng()),
    }
}

/// Keep the first `percentage` of the items, then shuffle them.
pub fn take_fraction<T>(mut items: Vec<T>, percentage: f64, seed: Option<u64>) -> Result<Vec<T>> {
    if !(percentage > 0.0 && percentage <= 1.0) {
        bail!("Percentage must be in (0, 1], got {}", percentage);
    }
    let keep = ((items.len() as f64) * percentage) as usize;
    items.truncate(keep);
    // seed + 1 keeps this shuffle independent of the fold shuffle
    shuffle_with(&mut items, seed.map(|s| s.wrapping_add(1)));
    Ok(items)
}
