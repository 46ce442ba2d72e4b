// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer loads graphs through GraphSource and
// never cares whether they come from TU benchmark files on
// disk or from the synthetic generator.
//
// Implementations:
//   - TuDatasetLoader    → reads the TU text format
//   - SyntheticGraphs    → cycles vs. stars, for smoke runs and tests
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::graph::Graph;

// ─── GraphSource ──────────────────────────────────────────────────────────────
/// Any component that can produce a labelled graph dataset.
pub trait GraphSource {
    /// Human-readable dataset name, printed in the final summary line.
    fn name(&self) -> &str;

    /// Load every graph. Labels must already be in 0..num_classes.
    fn load_all(&self) -> Result<Vec<Graph>>;
}
