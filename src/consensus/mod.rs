//! Co-occurrence consensus over several partitions of the same node set
//!
//! For every pair of nodes the consensus weight is the fraction of input
//! partitions that put both nodes in the same cluster. The full matrix is
//! quadratic in the node count, so storage and retention are explicit
//! options on [`ConsensusOptions`].

pub mod aggregator;

use ndarray::Array2;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Serialize, Deserialize};

pub use aggregator::aggregate;

/// How pair counts are accumulated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Storage {
    /// Hash map keyed by node pair; memory grows with co-occurring pairs only
    #[default]
    Sparse,
    /// N×N count matrix; memory grows with N²
    Dense,
}

/// Which pairs are kept in the output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Retention {
    /// Every pair that co-occurs at least once
    #[default]
    All,
    /// Pairs that co-occur in at least this many partitions
    MinCount(u32),
    /// For each node, its k strongest partners (ties by partner id); a pair
    /// survives if either endpoint keeps it
    TopK(usize),
}

/// Storage and completeness trade-off for [`aggregate`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusOptions {
    pub storage: Storage,
    pub retention: Retention,
}

/// One retained node pair, `i < j`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoOccurrence {
    pub i: u32,
    pub j: u32,

    /// Partitions placing `i` and `j` together
    pub count: u32,

    /// `count / partition_count`, in `(0, 1]`
    pub weight: f64,
}

/// Symmetric co-occurrence matrix stored as its sorted upper triangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoOccurrenceMatrix {
    pub node_count: usize,
    pub partition_count: usize,
    pub options: ConsensusOptions,

    /// Pairs that co-occurred but were dropped by the retention rule
    pub dropped_pairs: usize,

    entries: Vec<CoOccurrence>,
}

impl CoOccurrenceMatrix {
    pub(crate) fn new(
        node_count: usize,
        partition_count: usize,
        options: ConsensusOptions,
        entries: Vec<CoOccurrence>,
        dropped_pairs: usize,
    ) -> Self {
        Self {
            node_count,
            partition_count,
            options,
            dropped_pairs,
            entries,
        }
    }

    /// Retained pairs in ascending `(i, j)` order
    pub fn entries(&self) -> &[CoOccurrence] {
        &self.entries
    }

    /// Consensus weight of a pair; 0 for the diagonal and absent pairs
    pub fn get(&self, a: usize, b: usize) -> f64 {
        if a == b {
            return 0.0;
        }
        let key = if a < b { (a as u32, b as u32) } else { (b as u32, a as u32) };
        self.entries
            .binary_search_by(|e| (e.i, e.j).cmp(&key))
            .map(|pos| self.entries[pos].weight)
            .unwrap_or(0.0)
    }

    /// Number of retained pairs (edges of the consensus graph)
    pub fn edge_count(&self) -> usize {
        self.entries.len()
    }

    /// Weighted consensus graph with every node and one edge per retained pair.
    /// Node weights are the node ids.
    pub fn to_graph(&self) -> UnGraph<u32, f64> {
        let mut graph = UnGraph::with_capacity(self.node_count, self.entries.len());
        for node in 0..self.node_count {
            graph.add_node(node as u32);
        }
        for entry in &self.entries {
            graph.add_edge(
                NodeIndex::new(entry.i as usize),
                NodeIndex::new(entry.j as usize),
                entry.weight,
            );
        }
        graph
    }

    /// Full symmetric matrix with a zero diagonal; only sensible for small N
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.node_count, self.node_count));
        for entry in &self.entries {
            dense[[entry.i as usize, entry.j as usize]] = entry.weight;
            dense[[entry.j as usize, entry.i as usize]] = entry.weight;
        }
        dense
    }
}
