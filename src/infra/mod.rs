// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Output that is not the experiment itself:
//
//   metrics.rs         — per-(fold, epoch) metrics, the progress
//                        line format, and an optional CSV log
//
//   embedding_store.rs — JSON output of extracted embeddings
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// Epoch metrics and CSV logger
pub mod metrics;

/// JSON writer for graph embeddings
pub mod embedding_store;
