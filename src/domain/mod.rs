// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing the experiment:
// graphs, dataset sizes, and the accuracy record.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// One labelled graph with optional node features
pub mod graph;

// Sizes inferred from a loaded dataset
pub mod dataset_info;

// (epoch, fold) accuracy table and its reduction
pub mod accuracy;

// Core abstractions (traits) that other layers implement
pub mod traits;
