// ============================================================
// Layer 4 — TU Dataset Loader
// ============================================================
// Reads a graph-classification benchmark in the TU text format.
//
// Files (NAME = dataset name), looked up in
// <root>/<NAME>/raw/ first and <root>/<NAME>/ second:
//
//   NAME_A.txt                 "row, col" per line, 1-based global node ids
//   NAME_graph_indicator.txt   graph id (1-based) of every node, in node order
//   NAME_graph_labels.txt      one integer label per graph
//   NAME_node_labels.txt       optional, integer label(s) per node
//   NAME_node_attributes.txt   optional, comma separated floats per node
//
// Node features are built as:
//   [ node attributes (only with use_node_attr) | one-hot node labels ]
// Each node-label column is shifted so its minimum is 0 and one-hot
// encoded with width (max - min + 1).
//
// Graph labels are remapped to 0..C-1 by sorted unique value.
// Self-loops are dropped and duplicate edges collapsed.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §8 (Collections)

use anyhow::{bail, Context, Result};
use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use crate::domain::graph::Graph;
use crate::domain::traits::GraphSource;

/// Loads one named TU dataset from a data root directory.
pub struct TuDatasetLoader {
    root:          PathBuf,
    name:          String,
    use_node_attr: bool,
}

impl TuDatasetLoader {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self { root: root.into(), name: name.into(), use_node_attr: false }
    }

    /// Prepend continuous node attributes to the one-hot node labels.
    pub fn with_node_attributes(mut self, use_node_attr: bool) -> Self {
        self.use_node_attr = use_node_attr;
        self
    }

    /// Directory holding the NAME_*.txt files.
    fn raw_dir(&self) -> Result<PathBuf> {
        let base = self.root.join(&self.name);
        let raw  = base.join("raw");
        for dir in [&raw, &base] {
            if dir.join(format!("{}_A.txt", self.name)).exists() {
                return Ok(dir.clone());
            }
        }
        bail!(
            "Dataset '{}' not found: expected {}_A.txt in '{}' or '{}'",
            self.name, self.name, raw.display(), base.display()
        )
    }

    fn file(&self, dir: &Path, suffix: &str) -> PathBuf {
        dir.join(format!("{}_{}.txt", self.name, suffix))
    }
}

impl GraphSource for TuDatasetLoader {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_all(&self) -> Result<Vec<Graph>> {
        let dir = self.raw_dir()?;
        tracing::info!("Reading TU dataset '{}' from '{}'", self.name, dir.display());

        // ── Node → graph assignment ───────────────────────────────────────────
        let indicator: Vec<usize> = read_rows(&self.file(&dir, "graph_indicator"))?
            .into_iter()
            .map(|row| parse_single::<usize>(&row))
            .collect::<Result<_>>()
            .context("Bad graph indicator file")?;
        let layout = GraphLayout::from_indicator(&indicator)?;

        // ── Graph labels ──────────────────────────────────────────────────────
        let raw_labels: Vec<i64> = read_rows(&self.file(&dir, "graph_labels"))?
            .into_iter()
            .map(|row| parse_single::<i64>(&row))
            .collect::<Result<_>>()
            .context("Bad graph labels file")?;
        if raw_labels.len() != layout.num_graphs() {
            bail!(
                "{} graph labels for {} graphs in '{}'",
                raw_labels.len(), layout.num_graphs(), self.name
            );
        }
        let labels = remap_labels(&raw_labels);

        // ── Node features ─────────────────────────────────────────────────────
        let features = self.node_features(&dir, indicator.len())?;

        // ── Edges ─────────────────────────────────────────────────────────────
        let mut edges: Vec<BTreeSet<(usize, usize)>> = vec![BTreeSet::new(); layout.num_graphs()];
        let mut self_loops = 0usize;
        for (line, row) in read_rows(&self.file(&dir, "A"))?.into_iter().enumerate() {
            let pair = parse_all::<usize>(&row)
                .with_context(|| format!("Bad edge on line {}", line + 1))?;
            let [r, c] = pair.as_slice() else {
                bail!("Edge on line {} has {} fields, expected 2", line + 1, pair.len());
            };
            let (r, c) = (to_zero_based(*r)?, to_zero_based(*c)?);
            if r >= indicator.len() || c >= indicator.len() {
                bail!("Edge ({}, {}) on line {} refers to a missing node", r + 1, c + 1, line + 1);
            }
            if r == c {
                self_loops += 1;
                continue;
            }
            let (g, g_c) = (layout.graph_of[r], layout.graph_of[c]);
            if g != g_c {
                bail!("Edge ({}, {}) on line {} crosses graphs {} and {}", r + 1, c + 1, line + 1, g + 1, g_c + 1);
            }
            let offset = layout.offsets[g];
            edges[g].insert((r - offset, c - offset));
        }
        if self_loops > 0 {
            tracing::debug!("Dropped {} self-loops", self_loops);
        }

        // ── Assemble graphs ───────────────────────────────────────────────────
        let graphs = (0..layout.num_graphs())
            .map(|g| {
                let offset    = layout.offsets[g];
                let num_nodes = layout.counts[g];
                let edges     = edges[g].iter().copied().collect();
                match &features {
                    Some((dim, x)) => Graph::new(
                        num_nodes,
                        *dim,
                        x[offset * dim..(offset + num_nodes) * dim].to_vec(),
                        edges,
                        labels[g],
                    ),
                    None => Graph::featureless(num_nodes, edges, labels[g]),
                }
            })
            .collect::<Vec<_>>();

        tracing::info!(
            "Loaded {} graphs, {} nodes, {} directed edges, feature dim {}",
            graphs.len(),
            indicator.len(),
            graphs.iter().map(Graph::num_edges).sum::<usize>(),
            features.as_ref().map(|(d, _)| *d).unwrap_or(0)
        );
        Ok(graphs)
    }
}

impl TuDatasetLoader {
    /// Row-major [num_nodes, dim] feature matrix, or None when the
    /// dataset carries neither node labels nor (enabled) attributes.
    fn node_features(&self, dir: &Path, num_nodes: usize) -> Result<Option<(usize, Vec<f32>)>> {
        let mut blocks: Vec<(usize, Vec<f32>)> = Vec::new();

        let attr_path = self.file(dir, "node_attributes");
        if self.use_node_attr && attr_path.exists() {
            let rows: Vec<Vec<f32>> = read_rows(&attr_path)?
                .iter()
                .map(|r| parse_all::<f32>(r))
                .collect::<Result<_>>()
                .context("Bad node attributes file")?;
            blocks.push(dense_block(rows, num_nodes, "node attributes")?);
        }

        let label_path = self.file(dir, "node_labels");
        if label_path.exists() {
            let rows: Vec<Vec<i64>> = read_rows(&label_path)?
                .iter()
                .map(|r| parse_all::<i64>(r))
                .collect::<Result<_>>()
                .context("Bad node labels file")?;
            blocks.push(one_hot_block(&rows, num_nodes)?);
        }

        if blocks.is_empty() {
            return Ok(None);
        }

        let dim: usize = blocks.iter().map(|(d, _)| d).sum();
        let mut x = Vec::with_capacity(num_nodes * dim);
        for n in 0..num_nodes {
            for (d, block) in &blocks {
                x.extend_from_slice(&block[n * d..(n + 1) * d]);
            }
        }
        Ok(Some((dim, x)))
    }
}

// ─── Graph layout ─────────────────────────────────────────────────────────────
/// Where each graph's nodes live in the global node numbering.
struct GraphLayout {
    graph_of: Vec<usize>,
    offsets:  Vec<usize>,
    counts:   Vec<usize>,
}

impl GraphLayout {
    fn from_indicator(indicator: &[usize]) -> Result<Self> {
        let mut graph_of = Vec::with_capacity(indicator.len());
        let mut offsets  = Vec::new();
        let mut counts   = Vec::new();

        for (node, &id) in indicator.iter().enumerate() {
            let g = to_zero_based(id)?;
            if g + 1 < offsets.len() {
                bail!("Graph indicator is not sorted at node {}", node + 1);
            }
            if g > offsets.len() {
                bail!(
                    "Graph indicator skips from graph {} to graph {} at node {}",
                    offsets.len(), g + 1, node + 1
                );
            }
            if g == offsets.len() {
                offsets.push(node);
                counts.push(0);
            }
            counts[g] += 1;
            graph_of.push(g);
        }
        Ok(Self { graph_of, offsets, counts })
    }

    fn num_graphs(&self) -> usize {
        self.offsets.len()
    }
}

// ─── Parsing helpers ──────────────────────────────────────────────────────────
fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    Ok(text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.split(',').map(|f| f.trim().to_string()).collect())
        .collect())
}

fn parse_all<T: std::str::FromStr>(row: &[String]) -> Result<Vec<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    row.iter()
        .filter(|f| !f.is_empty())
        .map(|f| f.parse::<T>().with_context(|| format!("Cannot parse '{f}'")))
        .collect()
}

fn parse_single<T: std::str::FromStr>(row: &[String]) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let mut values = parse_all::<T>(row)?;
    match values.len() {
        1 => Ok(values.remove(0)),
        n => bail!("Expected one value per line, found {n}"),
    }
}

fn to_zero_based(id: usize) -> Result<usize> {
    id.checked_sub(1).context("TU ids are 1-based, found 0")
}

/// Map raw labels onto 0..C-1 in sorted order of their values.
fn remap_labels(raw: &[i64]) -> Vec<usize> {
    let index: BTreeMap<i64, usize> = raw
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(i, v)| (v, i))
        .collect();
    raw.iter().map(|v| index[v]).collect()
}

fn dense_block(rows: Vec<Vec<f32>>, num_nodes: usize, what: &str) -> Result<(usize, Vec<f32>)> {
    if rows.len() != num_nodes {
        bail!("{} rows of {} for {} nodes", rows.len(), what, num_nodes);
    }
    let dim = rows.first().map(Vec::len).unwrap_or(0);
    if let Some(i) = rows.iter().position(|r| r.len() != dim) {
        bail!("Row {} of {} has width {}, expected {}", i + 1, what, rows[i].len(), dim);
    }
    Ok((dim, rows.into_iter().flatten().collect()))
}

fn one_hot_block(rows: &[Vec<i64>], num_nodes: usize) -> Result<(usize, Vec<f32>)> {
    if rows.len() != num_nodes {
        bail!("{} rows of node labels for {} nodes", rows.len(), num_nodes);
    }
    let columns = rows.first().map(Vec::len).unwrap_or(0);
    if let Some(i) = rows.iter().position(|r| r.len() != columns) {
        bail!("Row {} of node labels has {} columns, expected {}", i + 1, rows[i].len(), columns);
    }

    // (min, width) per label column
    let ranges: Vec<(i64, usize)> = (0..columns)
        .map(|c| {
            let min = rows.iter().map(|r| r[c]).min().unwrap_or(0);
            let max = rows.iter().map(|r| r[c]).max().unwrap_or(0);
            (min, (max - min) as usize + 1)
        })
        .collect();
    let dim: usize = ranges.iter().map(|(_, w)| w).sum();

    let mut x = vec![0.0f32; num_nodes * dim];
    for (n, row) in rows.iter().enumerate() {
        let mut base = n * dim;
        for (value, (min, width)) in row.iter().zip(&ranges) {
            x[base + (value - min) as usize] = 1.0;
            base += width;
        }
    }
    Ok((dim, x))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Two graphs: a triangle (nodes 1-3) and an edge pair (nodes 4-5).
    fn write_toy(dir: &Path, with_node_labels: bool) {
        let raw = dir.join("TOY").join("raw");
        fs::create_dir_all(&raw).unwrap();
        fs::write(
            raw.join("TOY_A.txt"),
            "1, 2\n2, 1\n2, 3\n3, 2\n1, 3\n3, 1\n3, 3\n1, 2\n4, 5\n5, 4\n",
        ).unwrap();
        fs::write(raw.join("TOY_graph_indicator.txt"), "1\n1\n1\n2\n2\n").unwrap();
        fs::write(raw.join("TOY_graph_labels.txt"), "-1\n1\n").unwrap();
        if with_node_labels {
            fs::write(raw.join("TOY_node_labels.txt"), "2\n3\n4\n2\n2\n").unwrap();
        }
    }

    #[test]
    fn test_loads_graphs_and_remaps_labels() {
        let tmp = tempfile::tempdir().unwrap();
        write_toy(tmp.path(), true);

        let graphs = TuDatasetLoader::new(tmp.path(), "TOY").load_all().unwrap();
        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[0].num_nodes, 3);
        assert_eq!(graphs[1].num_nodes, 2);
        assert_eq!(graphs[0].label, 0);
        assert_eq!(graphs[1].label, 1);
    }

    #[test]
    fn test_drops_self_loops_and_duplicates() {
        let tmp = tempfile::tempdir().unwrap();
        write_toy(tmp.path(), true);

        let graphs = TuDatasetLoader::new(tmp.path(), "TOY").load_all().unwrap();
        // 6 triangle edges survive; "3, 3" and the repeated "1, 2" do not
        assert_eq!(graphs[0].num_edges(), 6);
        assert!(graphs[0].edges.iter().all(|(s, d)| s != d));
        // second graph uses local indices
        assert_eq!(graphs[1].edges, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_node_labels_one_hot() {
        let tmp = tempfile::tempdir().unwrap();
        write_toy(tmp.path(), true);

        let graphs = TuDatasetLoader::new(tmp.path(), "TOY").load_all().unwrap();
        assert_eq!(graphs[0].feature_dim, 3);
        assert_eq!(graphs[0].feature_row(0), Some(&[1.0, 0.0, 0.0][..]));
        assert_eq!(graphs[0].feature_row(2), Some(&[0.0, 0.0, 1.0][..]));
        assert_eq!(graphs[1].feature_row(1), Some(&[1.0, 0.0, 0.0][..]));
    }

    #[test]
    fn test_missing_node_labels_leave_features_absent() {
        let tmp = tempfile::tempdir().unwrap();
        write_toy(tmp.path(), false);

        let graphs = TuDatasetLoader::new(tmp.path(), "TOY").load_all().unwrap();
        assert!(graphs.iter().all(|g| !g.has_features()));
    }

    #[test]
    fn test_files_directly_under_dataset_dir() {
        let tmp  = tempfile::tempdir().unwrap();
        let flat = tmp.path().join("FLAT");
        fs::create_dir_all(&flat).unwrap();
        fs::write(flat.join("FLAT_A.txt"), "1, 2\n2, 1\n").unwrap();
        fs::write(flat.join("FLAT_graph_indicator.txt"), "1\n1\n").unwrap();
        fs::write(flat.join("FLAT_graph_labels.txt"), "0\n").unwrap();

        let graphs = TuDatasetLoader::new(tmp.path(), "FLAT").load_all().unwrap();
        assert_eq!(graphs.len(), 1);
    }

    #[test]
    fn test_missing_dataset_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = TuDatasetLoader::new(tmp.path(), "NOPE").load_all().unwrap_err();
        assert!(err.to_string().contains("NOPE"));
    }

    #[test]
    fn test_edge_out_of_range_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_toy(tmp.path(), false);
        fs::write(tmp.path().join("TOY/raw/TOY_A.txt"), "1, 9\n").unwrap();
        assert!(TuDatasetLoader::new(tmp.path(), "TOY").load_all().is_err());
    }

    #[test]
    fn test_indicator_gap_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_toy(tmp.path(), false);
        let raw = tmp.path().join("TOY/raw");
        fs::write(raw.join("TOY_A.txt"), "1, 2\n2, 1\n3, 4\n4, 3\n").unwrap();
        fs::write(raw.join("TOY_graph_indicator.txt"), "1\n1\n3\n3\n").unwrap();
        fs::write(raw.join("TOY_graph_labels.txt"), "0\n1\n0\n").unwrap();

        let err = TuDatasetLoader::new(tmp.path(), "TOY").load_all().unwrap_err();
        assert!(format!("{err:#}").contains("skips"));
    }

    #[test]
    fn test_indicator_not_starting_at_one_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_toy(tmp.path(), false);
        let raw = tmp.path().join("TOY/raw");
        fs::write(raw.join("TOY_graph_indicator.txt"), "2\n2\n2\n3\n3\n").unwrap();
        fs::write(raw.join("TOY_graph_labels.txt"), "0\n1\n0\n").unwrap();

        assert!(TuDatasetLoader::new(tmp.path(), "TOY").load_all().is_err());
    }
}
