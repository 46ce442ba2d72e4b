// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All model code lives here:
//
//   layer.rs      — one GIN message-passing round
//                   (sum aggregation, 2-layer MLP, ReLU, BatchNorm)
//
//   readout.rs    — sum / mean pooling of node rows per graph
//
//   encoder.rs    — L stacked GIN layers with per-layer readout,
//                   concatenated into the graph embedding
//
//   classifier.rs — Linear → ReLU → Dropout → Linear → log-softmax
//                   head on the graph embedding, NLL loss
//
//   trainer.rs    — epoch loop: Adam steps, step LR decay,
//                   accuracy evaluation on the inner backend
//
//   embedder.rs   — embedding extraction for unsupervised analysis
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Xu et al. (2019) How Powerful are Graph Neural Networks?
//            Sun et al. (2020) InfoGraph

/// GIN message-passing layer
pub mod layer;

/// Graph readout (pooling)
pub mod readout;

/// Stacked GIN encoder
pub mod encoder;

/// Classification head and loss
pub mod classifier;

/// Training loop, evaluation and LR schedule
pub mod trainer;

/// Graph embedding extraction
pub mod embedder;
