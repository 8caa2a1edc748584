//! Cluster statistics and the FO1 objective

use std::collections::HashSet;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use statrs::statistics::Statistics;
use crate::cluster::{Cluster, Partition};
use crate::error::Result;
use crate::graph::ProximityGraph;

/// FO1 of a partition: sum over clusters of (slowest member velocity × size)
pub fn fo1(partition: &Partition, graph: &ProximityGraph) -> Result<f64> {
    partition.check_node_count(graph.node_count)?;
    Ok(fo1_of_clusters(&partition.clusters(), graph))
}

/// FO1 over explicit member lists; empty clusters contribute nothing
pub fn fo1_of_clusters(clusters: &[Vec<u32>], graph: &ProximityGraph) -> f64 {
    clusters
        .iter()
        .filter(|members| !members.is_empty())
        .map(|members| min_velocity(graph, members) * members.len() as f64)
        .sum()
}

fn min_velocity(graph: &ProximityGraph, members: &[u32]) -> f64 {
    members
        .iter()
        .map(|&m| graph.velocity(m as usize))
        .fold(f64::INFINITY, f64::min)
}

/// Calculate density (internal edges / potential edges)
pub fn cluster_density(graph: &ProximityGraph, members: &[u32]) -> f64 {
    let n = members.len();
    if n <= 1 {
        return 1.0; // By convention, singleton clusters have density 1
    }

    // Potential edges = n * (n - 1) / 2 for an undirected graph
    let potential_edges = n * (n - 1) / 2;

    let member_set: HashSet<u32> = members.iter().copied().collect();

    // Each internal edge is seen from both endpoints
    let mut endpoint_hits = 0;
    for &node in members {
        for &neighbor in graph.neighbors(node as usize) {
            if member_set.contains(&neighbor) {
                endpoint_hits += 1;
            }
        }
    }

    (endpoint_hits / 2) as f64 / potential_edges as f64
}

/// Summaries for every cluster of a partition, largest first
pub fn describe_clusters(graph: &ProximityGraph, partition: &Partition) -> Result<Vec<Cluster>> {
    partition.check_node_count(graph.node_count)?;

    let mut clusters: Vec<Cluster> = partition
        .clusters()
        .into_par_iter()
        .map(|members| Cluster {
            id: partition.label(members[0] as usize),
            size: members.len(),
            min_velocity: min_velocity(graph, &members),
            density: cluster_density(graph, &members),
            members,
        })
        .collect();

    clusters.sort_by(|a, b| b.size.cmp(&a.size).then(a.id.cmp(&b.id)));

    Ok(clusters)
}

/// Cluster size distribution for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeDistribution {
    pub cluster_count: usize,
    pub largest: usize,
    pub smallest: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub singletons: usize,
}

impl SizeDistribution {
    pub fn from_partition(partition: &Partition) -> Self {
        let sizes: Vec<usize> = partition.clusters().iter().map(Vec::len).collect();
        Self::from_sizes(&sizes)
    }

    pub fn from_sizes(sizes: &[usize]) -> Self {
        if sizes.is_empty() {
            return Self {
                cluster_count: 0,
                largest: 0,
                smallest: 0,
                mean: 0.0,
                std_dev: 0.0,
                singletons: 0,
            };
        }

        let as_f64: Vec<f64> = sizes.iter().map(|&s| s as f64).collect();

        Self {
            cluster_count: sizes.len(),
            largest: Iterator::max(sizes.iter().copied()).unwrap_or(0),
            smallest: Iterator::min(sizes.iter().copied()).unwrap_or(0),
            mean: as_f64.iter().mean(),
            std_dev: as_f64.iter().population_std_dev(),
            singletons: sizes.iter().filter(|&&s| s == 1).count(),
        }
    }
}
