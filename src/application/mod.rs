// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to run one experiment.
//
// Rules for this layer:
//   - No model math here (that's Layer 5)
//   - No file formats here (that's Layers 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// K-fold cross-validated graph classification
pub mod cross_validation_use_case;

// Embedding extraction for unsupervised analysis
pub mod embed_use_case;
