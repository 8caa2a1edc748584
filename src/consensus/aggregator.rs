//! Pair counting and normalisation for consensus matrices

use std::collections::HashMap;
use itertools::Itertools;
use ndarray::Array2;
use rayon::prelude::*;
use crate::cluster::Partition;
use crate::consensus::{CoOccurrence, CoOccurrenceMatrix, ConsensusOptions, Retention, Storage};
use crate::error::{AnalyzerError, Result};

type PairCounts = HashMap<(u32, u32), u32>;

/// Aggregate partitions of `0..node_count` into a co-occurrence matrix
pub fn aggregate(
    partitions: &[Partition],
    node_count: usize,
    options: ConsensusOptions,
) -> Result<CoOccurrenceMatrix> {
    if partitions.is_empty() {
        return Err(AnalyzerError::invalid("consensus needs at least one partition"));
    }
    if node_count == 0 {
        return Err(AnalyzerError::invalid("consensus needs at least one node"));
    }
    for (idx, partition) in partitions.iter().enumerate() {
        partition.check_node_count(node_count).map_err(|_| {
            AnalyzerError::invalid(format!(
                "partition {} covers {} nodes, expected {}",
                idx,
                partition.len(),
                node_count
            ))
        })?;
    }

    log::info!(
        "Aggregating {} partitions over {} nodes ({:?} storage, {:?} retention)",
        partitions.len(), node_count, options.storage, options.retention
    );

    let counts = match options.storage {
        Storage::Sparse => sparse_counts(partitions),
        Storage::Dense => dense_counts(partitions, node_count),
    };

    let total_pairs = counts.len();
    let kept = retain(counts, node_count, options.retention);
    let dropped_pairs = total_pairs - kept.len();

    if dropped_pairs > 0 {
        log::info!(
            "Retention {:?} kept {} of {} co-occurring pairs",
            options.retention, kept.len(), total_pairs
        );
    }

    let partition_count = partitions.len();
    let entries = kept
        .into_iter()
        .map(|(i, j, count)| CoOccurrence {
            i,
            j,
            count,
            weight: count as f64 / partition_count as f64,
        })
        .collect::<Vec<_>>();

    log::info!("Consensus graph has {} weighted edges", entries.len());

    Ok(CoOccurrenceMatrix::new(node_count, partition_count, options, entries, dropped_pairs))
}

/// Unordered pairs `(i, j)`, `i < j`, sharing a cluster in one partition
fn partition_pairs(partition: &Partition) -> impl Iterator<Item = (u32, u32)> {
    partition
        .clusters()
        .into_iter()
        .flat_map(|members| members.into_iter().tuple_combinations::<(u32, u32)>())
}

/// Count pairs per partition in parallel and merge by summing, so the
/// result does not depend on scheduling
fn sparse_counts(partitions: &[Partition]) -> Vec<(u32, u32, u32)> {
    let merged: PairCounts = partitions
        .par_iter()
        .map(|partition| {
            let mut local = PairCounts::new();
            for pair in partition_pairs(partition) {
                *local.entry(pair).or_insert(0) += 1;
            }
            local
        })
        .reduce(PairCounts::new, |mut acc, local| {
            for (pair, count) in local {
                *acc.entry(pair).or_insert(0) += count;
            }
            acc
        });

    let mut counts: Vec<(u32, u32, u32)> = merged
        .into_iter()
        .map(|((i, j), count)| (i, j, count))
        .collect();
    counts.sort_unstable_by_key(|&(i, j, _)| (i, j));
    counts
}

/// Upper-triangle counts in a dense matrix
fn dense_counts(partitions: &[Partition], node_count: usize) -> Vec<(u32, u32, u32)> {
    let mut matrix = Array2::<u32>::zeros((node_count, node_count));

    for partition in partitions {
        for (i, j) in partition_pairs(partition) {
            matrix[[i as usize, j as usize]] += 1;
        }
    }

    let mut counts = Vec::new();
    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let count = matrix[[i, j]];
            if count > 0 {
                counts.push((i as u32, j as u32, count));
            }
        }
    }
    counts
}

fn retain(counts: Vec<(u32, u32, u32)>, node_count: usize, retention: Retention) -> Vec<(u32, u32, u32)> {
    match retention {
        Retention::All => counts,
        Retention::MinCount(min) => counts.into_iter().filter(|&(_, _, c)| c >= min).collect(),
        Retention::TopK(k) => top_k(counts, node_count, k),
    }
}

fn top_k(counts: Vec<(u32, u32, u32)>, node_count: usize, k: usize) -> Vec<(u32, u32, u32)> {
    // Per node: (count, partner, entry index)
    let mut partners: Vec<Vec<(u32, u32, usize)>> = vec![Vec::new(); node_count];
    for (idx, &(i, j, count)) in counts.iter().enumerate() {
        partners[i as usize].push((count, j, idx));
        partners[j as usize].push((count, i, idx));
    }

    let mut keep = vec![false; counts.len()];
    for list in &mut partners {
        list.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        for &(_, _, idx) in list.iter().take(k) {
            keep[idx] = true;
        }
    }

    counts
        .into_iter()
        .zip(keep)
        .filter_map(|(entry, kept)| kept.then_some(entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partitions(labels: &[&[u32]]) -> Vec<Partition> {
        labels.iter().map(|l| Partition::from_labels(l.to_vec())).collect()
    }

    fn three_methods() -> Vec<Partition> {
        partitions(&[&[0, 0, 1, 1], &[0, 1, 1, 1], &[0, 0, 0, 1]])
    }

    #[test]
    fn test_three_partition_scenario() {
        let m = aggregate(&three_methods(), 4, ConsensusOptions::default()).unwrap();

        assert!((m.get(0, 1) - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.get(2, 3) - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.get(1, 2) - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.get(0, 2) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(m.get(0, 3), 0.0);
        assert_eq!(m.get(2, 2), 0.0);
        assert_eq!(m.edge_count(), 5);
    }

    #[test]
    fn test_symmetric_and_bounded() {
        let m = aggregate(&three_methods(), 4, ConsensusOptions::default()).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(m.get(i, j), m.get(j, i));
                assert!((0.0..=1.0).contains(&m.get(i, j)));
            }
        }
    }

    #[test]
    fn test_unanimous_pair_has_weight_one() {
        let m = aggregate(&partitions(&[&[4, 4, 1], &[0, 0, 0]]), 3, ConsensusOptions::default()).unwrap();
        assert_eq!(m.get(0, 1), 1.0);
        assert_eq!(m.get(1, 2), 0.5);
    }

    #[test]
    fn test_single_partition_is_binary() {
        let m = aggregate(&partitions(&[&[2, 0, 2, 0, 1]]), 5, ConsensusOptions::default()).unwrap();
        let dense = m.to_dense();
        for i in 0..5 {
            for j in 0..5 {
                let v = dense[[i, j]];
                assert!(v == 0.0 || v == 1.0);
            }
        }
        assert_eq!(dense[[0, 2]], 1.0);
        assert_eq!(dense[[1, 3]], 1.0);
        assert_eq!(dense[[0, 1]], 0.0);
    }

    #[test]
    fn test_repeated_aggregation_is_identical() {
        let input = three_methods();
        let a = aggregate(&input, 4, ConsensusOptions::default()).unwrap();
        let b = aggregate(&input, 4, ConsensusOptions::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sparse_and_dense_agree() {
        let input = partitions(&[
            &[0, 1, 0, 2, 1, 2, 0],
            &[3, 3, 3, 1, 1, 1, 1],
            &[0, 0, 1, 1, 2, 2, 0],
        ]);
        let sparse = aggregate(&input, 7, ConsensusOptions::default()).unwrap();
        let dense = aggregate(
            &input,
            7,
            ConsensusOptions { storage: Storage::Dense, retention: Retention::All },
        )
        .unwrap();
        assert_eq!(sparse.entries(), dense.entries());
    }

    #[test]
    fn test_min_count_retention() {
        let options = ConsensusOptions { storage: Storage::Sparse, retention: Retention::MinCount(2) };
        let m = aggregate(&three_methods(), 4, options).unwrap();
        assert_eq!(m.edge_count(), 3);
        assert_eq!(m.dropped_pairs, 2);
        assert_eq!(m.get(0, 2), 0.0);
    }

    #[test]
    fn test_top_k_retention_stays_symmetric() {
        let options = ConsensusOptions { storage: Storage::Sparse, retention: Retention::TopK(1) };
        let m = aggregate(&three_methods(), 4, options).unwrap();

        // 0 keeps 1, 1 keeps 0, 2 keeps 1, 3 keeps 2
        let pairs: Vec<(u32, u32)> = m.entries().iter().map(|e| (e.i, e.j)).collect();
        assert_eq!(pairs, vec![(0, 1), (1, 2), (2, 3)]);
        assert_eq!(m.get(3, 2), m.get(2, 3));
    }

    #[test]
    fn test_consensus_graph() {
        let m = aggregate(&three_methods(), 4, ConsensusOptions::default()).unwrap();
        let graph = m.to_graph();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 5);
        assert_eq!(petgraph::algo::connected_components(&graph), 1);
    }

    #[test]
    fn test_rejects_inconsistent_input() {
        assert!(aggregate(&[], 4, ConsensusOptions::default()).is_err());
        assert!(aggregate(&three_methods(), 5, ConsensusOptions::default()).is_err());
        assert!(aggregate(&partitions(&[&[0, 0], &[0, 0, 0]]), 2, ConsensusOptions::default()).is_err());
        assert!(aggregate(&partitions(&[&[]]), 0, ConsensusOptions::default()).is_err());
    }
}
