//! Baseline partitions used alongside the greedy heuristic in consensus runs

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use crate::cluster::Partition;
use crate::data::AgentTable;
use crate::error::{AnalyzerError, Result};
use crate::graph::algorithms::component_labels;
use crate::graph::ProximityGraph;

const FEATURES: usize = 5;

/// Lloyd's k-means over the agent features `(x, y, v, theta, battery)`.
///
/// Initial centroids are `k` distinct agents drawn with the seeded RNG.
pub fn kmeans(agents: &AgentTable, k: usize, max_iterations: usize, seed: u64) -> Result<Partition> {
    let n = agents.len();
    if k == 0 || k > n {
        return Err(AnalyzerError::invalid(format!(
            "k-means needs 1 <= k <= {} agents, got k = {}",
            n, k
        )));
    }

    log::info!("Running k-means baseline (k {}, seed {})", k, seed);

    let points = agents.feature_rows();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids: Vec<[f64; FEATURES]> = rand::seq::index::sample(&mut rng, n, k)
        .into_iter()
        .map(|i| points[i])
        .collect();

    let mut labels = assign(&points, &centroids);

    for iteration in 1..=max_iterations {
        centroids = recompute(&points, &labels, &centroids);
        let next = assign(&points, &centroids);

        if next == labels {
            log::debug!("k-means converged after {} iteration(s)", iteration);
            break;
        }
        labels = next;
    }

    Ok(Partition::from_labels(labels))
}

fn squared_distance(a: &[f64; FEATURES], b: &[f64; FEATURES]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Nearest centroid per point, ties to the lower centroid index
fn assign(points: &[[f64; FEATURES]], centroids: &[[f64; FEATURES]]) -> Vec<u32> {
    points
        .par_iter()
        .map(|p| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = squared_distance(p, centroid);
                if d < best_dist {
                    best = c;
                    best_dist = d;
                }
            }
            best as u32
        })
        .collect()
}

/// Mean of each cluster; empty clusters keep their previous centroid
fn recompute(
    points: &[[f64; FEATURES]],
    labels: &[u32],
    previous: &[[f64; FEATURES]],
) -> Vec<[f64; FEATURES]> {
    let mut sums = vec![[0.0; FEATURES]; previous.len()];
    let mut counts = vec![0usize; previous.len()];

    for (point, &label) in points.iter().zip(labels) {
        let sum = &mut sums[label as usize];
        for (s, x) in sum.iter_mut().zip(point) {
            *s += x;
        }
        counts[label as usize] += 1;
    }

    sums.iter()
        .zip(&counts)
        .zip(previous)
        .map(|((sum, &count), prev)| {
            if count == 0 {
                *prev
            } else {
                sum.map(|s| s / count as f64)
            }
        })
        .collect()
}

/// Connected components of the proximity graph as a partition
pub fn components(graph: &ProximityGraph) -> Partition {
    Partition::from_labels(component_labels(graph))
}
