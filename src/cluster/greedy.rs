//! Velocity-gated greedy clustering
//!
//! Clusters grow breadth-first from a seed over proximity edges. A neighbour
//! joins when its velocity is within `delta_v` of the seed's velocity; the
//! seed's velocity stays the reference for the whole cluster, so membership
//! is independent of the order the queue is drained in. Only the seed order
//! changes the result.

use std::collections::VecDeque;
use serde::{Serialize, Deserialize};
use crate::cluster::Partition;
use crate::error::{AnalyzerError, Result};
use crate::graph::ProximityGraph;

/// Order in which unvisited nodes are picked as cluster seeds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum SeedOrder {
    /// Ascending node id
    #[default]
    NodeId,
    /// Fastest first, ties by ascending node id
    VelocityDescending,
}

/// Cluster with seeds taken in ascending node id order
pub fn cluster(graph: &ProximityGraph, delta_v: f64) -> Result<Partition> {
    cluster_with_order(graph, delta_v, SeedOrder::NodeId)
}

/// Cluster with an explicit seed order
pub fn cluster_with_order(graph: &ProximityGraph, delta_v: f64, order: SeedOrder) -> Result<Partition> {
    if !delta_v.is_finite() || delta_v < 0.0 {
        return Err(AnalyzerError::invalid(format!(
            "delta_v must be a non-negative number, got {}",
            delta_v
        )));
    }

    log::info!(
        "Greedy clustering {} nodes (delta_v {}, seeds by {:?})",
        graph.node_count, delta_v, order
    );

    let node_count = graph.node_count;
    let mut labels = vec![u32::MAX; node_count];
    let mut queue = VecDeque::new();
    let mut next_label = 0u32;

    for seed in seed_sequence(graph, order) {
        if labels[seed] != u32::MAX {
            continue;
        }

        let label = next_label;
        next_label += 1;
        let base_velocity = graph.velocity(seed);

        labels[seed] = label;
        queue.push_back(seed);

        while let Some(u) = queue.pop_front() {
            for &w in graph.neighbors(u) {
                let w = w as usize;
                if labels[w] != u32::MAX {
                    continue;
                }
                if (graph.velocity(w) - base_velocity).abs() <= delta_v {
                    labels[w] = label;
                    queue.push_back(w);
                }
            }
        }
    }

    log::info!("Greedy clustering produced {} clusters", next_label);

    Ok(Partition::from_labels(labels))
}

fn seed_sequence(graph: &ProximityGraph, order: SeedOrder) -> Vec<usize> {
    let mut seeds: Vec<usize> = (0..graph.node_count).collect();
    if order == SeedOrder::VelocityDescending {
        // Stable sort keeps ascending ids among equal velocities
        seeds.sort_by(|&a, &b| graph.velocity(b).total_cmp(&graph.velocity(a)));
    }
    seeds
}
