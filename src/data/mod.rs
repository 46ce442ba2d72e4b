// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from benchmark files on disk to tensor batches.
//
//   TU text files / synthetic generator
//       │
//       ▼
//   GraphSource::load_all   → Vec<Graph>
//       │
//       ▼
//   prepare_graphs          → fill absent features, DatasetInfo
//       │
//       ▼
//   take_fraction + KFold   → (train, test) index folds
//       │
//       ▼
//   GraphDataset            → implements Burn's Dataset trait
//       │
//       ▼
//   GraphBatcher            → disjoint-union GraphBatch
//       │
//       ▼
//   DataLoader              → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads the TU benchmark text format
pub mod tu_loader;

/// Labelled cycles / stars / cliques / paths without disk access
pub mod synthetic;

/// Implements Burn's Dataset trait for graphs
pub mod dataset;

/// Implements Burn's Batcher trait to build disjoint-union batches
pub mod batcher;

/// K-fold partitioning and dataset fraction
pub mod splitter;
