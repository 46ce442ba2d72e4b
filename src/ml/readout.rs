// ============================================================
// Layer 5 — Graph Readout (Pooling)
// ============================================================
// Reduces node rows to one row per graph using the batch vector:
//
//   sum:   out[g] = Σ_{i : batch[i] = g} x[i]
//   mean:  out[g] = sum[g] / max(n_g, 1)
//
// The sum is a scatter-add: select_assign adds every row of `x`
// into the row of a zero [G, F] tensor named by `batch`.
// Empty graphs pool to a zero row.

use burn::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readout {
    Sum,
    Mean,
}

/// Pool node features `x` [N, F] into [G, F], G = node_counts.len().
pub fn global_pool<B: Backend>(
    x:           Tensor<B, 2>,
    batch:       Tensor<B, 1, Int>,
    node_counts: &[usize],
    readout:     Readout,
) -> Tensor<B, 2> {
    let [_, dim]   = x.dims();
    let num_graphs = node_counts.len();
    let device     = x.device();

    let summed = Tensor::<B, 2>::zeros([num_graphs, dim], &device).select_assign(0, batch, x);

    match readout {
        Readout::Sum  => summed,
        Readout::Mean => {
            let counts: Vec<f32> = node_counts.iter().map(|&n| n.max(1) as f32).collect();
            let counts = Tensor::<B, 1>::from_floats(counts.as_slice(), &device)
                .reshape([num_graphs, 1]);
            summed / counts
        }
    }
}
