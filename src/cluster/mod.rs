//! Cluster analysis module

pub mod greedy;
pub mod metrics;
pub mod baseline;

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use crate::error::{AnalyzerError, Result};

/// Total assignment of nodes to clusters, stored as a dense label array.
///
/// Labels are arbitrary non-negative ids, unique within one partition and not
/// comparable across partitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    labels: Vec<u32>,
}

impl Partition {
    pub fn from_labels(labels: Vec<u32>) -> Self {
        Self { labels }
    }

    /// Number of nodes covered
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, node: usize) -> u32 {
        self.labels[node]
    }

    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Check the partition covers exactly `0..node_count`
    pub fn check_node_count(&self, node_count: usize) -> Result<()> {
        if self.labels.len() != node_count {
            return Err(AnalyzerError::invalid(format!(
                "partition covers {} nodes, expected {}",
                self.labels.len(),
                node_count
            )));
        }
        Ok(())
    }

    /// Member lists grouped by label, in ascending label order
    pub fn clusters(&self) -> Vec<Vec<u32>> {
        let mut grouped: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for (node, &label) in self.labels.iter().enumerate() {
            grouped.entry(label).or_default().push(node as u32);
        }
        grouped.into_values().collect()
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters().len()
    }
}

/// A cluster of the proximity graph with its summary figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Label of this cluster in its partition
    pub id: u32,

    /// Members of this cluster (node indices)
    pub members: Vec<u32>,

    /// Size of the cluster
    pub size: usize,

    /// Slowest member velocity, the cluster's FO1 anchor
    pub min_velocity: f64,

    /// Density: internal edges / potential edges
    pub density: f64,
}
