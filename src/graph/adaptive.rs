//! Epsilon-ball graph construction with adaptive radius growth

use crate::config::validate_radius_policy;
use crate::data::AgentTable;
use crate::error::{AnalyzerError, Result};
use crate::graph::algorithms::count_components;
use crate::graph::builder::GraphBuilder;
use crate::graph::spatial::SpatialIndex;
use crate::graph::ProximityGraph;

/// Result of a graph build, with the diagnostics callers need to tell a
/// connected graph from a best-effort one
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub graph: ProximityGraph,

    /// Radius the returned graph was built with
    pub final_radius: f64,

    /// Connected components of the returned graph
    pub component_count: usize,

    /// Number of radii tried
    pub iterations: usize,
}

impl BuildOutcome {
    /// The radius cap was reached without connecting the graph
    pub fn is_degraded(&self) -> bool {
        self.component_count > 1
    }
}

/// Build a proximity graph, growing the radius geometrically from `radius0`
/// until the graph is connected or `radius_max` is reached.
///
/// Growth is clamped to `radius_max`, so the cap itself is always tried
/// before giving up.
pub fn build(
    agents: &AgentTable,
    radius0: f64,
    radius_max: f64,
    growth_factor: f64,
) -> Result<BuildOutcome> {
    if agents.is_empty() {
        return Err(AnalyzerError::invalid("cannot build a graph over zero agents"));
    }
    validate_radius_policy(radius0, radius_max, growth_factor)?;

    log::info!(
        "Building proximity graph over {} agents (radius {} -> {}, growth {})",
        agents.len(), radius0, radius_max, growth_factor
    );

    // The tree does not depend on the radius, so it is built once
    let index = SpatialIndex::new(agents.agents());

    let mut radius = radius0;
    let mut iterations = 0;

    loop {
        iterations += 1;
        let graph = graph_at_radius(agents, &index, radius)?;
        let component_count = count_components(&graph);

        log::debug!(
            "Radius {:.4}: {} edges, {} components",
            radius, graph.edge_count(), component_count
        );

        if component_count == 1 || radius >= radius_max {
            let outcome = BuildOutcome {
                graph,
                final_radius: radius,
                component_count,
                iterations,
            };
            report(&outcome);
            return Ok(outcome);
        }

        radius = (radius * growth_factor).min(radius_max);
    }
}

/// Build a proximity graph at a single fixed radius
pub fn build_fixed(agents: &AgentTable, radius: f64) -> Result<BuildOutcome> {
    build(agents, radius, radius, 2.0)
}

fn graph_at_radius(agents: &AgentTable, index: &SpatialIndex, radius: f64) -> Result<ProximityGraph> {
    let mut builder = GraphBuilder::from_agents(agents.agents());
    for (i, j, dist) in index.pairs_within(radius) {
        builder.add_edge(i, j, dist)?;
    }
    Ok(builder.build())
}

fn report(outcome: &BuildOutcome) {
    if outcome.is_degraded() {
        log::warn!(
            "Graph still has {} components at the radius cap {:.4}",
            outcome.component_count, outcome.final_radius
        );
    } else {
        log::info!(
            "Connected graph at radius {:.4} after {} iteration(s): {} nodes, {} edges",
            outcome.final_radius,
            outcome.iterations,
            outcome.graph.node_count,
            outcome.graph.edge_count()
        );
    }
    log::info!(
        "Graph memory usage: {:.2} MB",
        outcome.graph.memory_usage() as f64 / (1024.0 * 1024.0)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(points: &[(f64, f64)]) -> AgentTable {
        let rows: Vec<[f64; 5]> = points.iter().map(|&(x, y)| [x, y, 1.0, 0.0, 50.0]).collect();
        AgentTable::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_two_pairs_join_after_growth() {
        let agents = table(&[(0.0, 0.0), (1.0, 0.0), (10.0, 10.0), (11.0, 10.0)]);
        let outcome = build(&agents, 2.0, 20.0, 1.5).unwrap();

        // Closest inter-pair gap is sqrt(181), first reached at 2 * 1.5^5
        assert_eq!(outcome.component_count, 1);
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.iterations, 6);
        assert!((outcome.final_radius - 2.0 * 1.5f64.powi(5)).abs() < 1e-9);
        assert!(outcome.final_radius >= 181f64.sqrt());
    }

    #[test]
    fn test_initial_radius_keeps_pairs_separate() {
        let agents = table(&[(0.0, 0.0), (1.0, 0.0), (10.0, 10.0), (11.0, 10.0)]);
        let outcome = build_fixed(&agents, 2.0).unwrap();

        assert_eq!(outcome.component_count, 2);
        assert!(outcome.is_degraded());
        assert_eq!(outcome.graph.edges().collect::<Vec<_>>(), vec![(0, 1, 1.0), (2, 3, 1.0)]);
    }

    #[test]
    fn test_cap_is_tried_before_giving_up() {
        let agents = table(&[(0.0, 0.0), (10.0, 0.0)]);
        // 1, 3, 9, then clamped to 10
        let outcome = build(&agents, 1.0, 10.0, 3.0).unwrap();
        assert_eq!(outcome.component_count, 1);
        assert_eq!(outcome.final_radius, 10.0);
        assert_eq!(outcome.iterations, 4);
    }

    #[test]
    fn test_degraded_result_is_not_an_error() {
        let agents = table(&[(0.0, 0.0), (100.0, 0.0), (200.0, 0.0)]);
        let outcome = build(&agents, 1.0, 50.0, 2.0).unwrap();
        assert_eq!(outcome.component_count, 3);
        assert_eq!(outcome.final_radius, 50.0);
        assert_eq!(outcome.graph.node_count, 3);
    }

    #[test]
    fn test_colocated_fleet_connects() {
        // A fleet parked at one dock: every robot shares the same position
        let rows = vec![[5.0, 5.0, 10.0, 0.0, 50.0]; 40];
        let agents = AgentTable::from_rows(&rows).unwrap();
        let outcome = build(&agents, 1.0, 10.0, 1.5).unwrap();

        assert_eq!(outcome.component_count, 1);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.graph.edge_count(), 40 * 39 / 2);
        assert!(outcome.graph.edges().all(|(_, _, w)| w == 0.0));
    }

    #[test]
    fn test_graph_invariants() {
        let points: Vec<(f64, f64)> = (0..40)
            .map(|i| ((i % 7) as f64 * 3.1, (i / 7) as f64 * 2.9 + (i % 3) as f64 * 0.4))
            .collect();
        let agents = table(&points);
        let outcome = build(&agents, 1.0, 100.0, 1.3).unwrap();
        let graph = &outcome.graph;

        assert_eq!(graph.node_count, 40);
        assert_eq!(outcome.component_count, 1);
        for (u, v, w) in graph.edges() {
            assert_ne!(u, v);
            let a = agents.get(u as usize).unwrap();
            let b = agents.get(v as usize).unwrap();
            assert!((w - a.distance_to(b)).abs() < 1e-12);
            assert!(w <= outcome.final_radius);
            assert!(graph.has_edge(v as usize, u));
        }
    }

    #[test]
    fn test_rejects_invalid_input() {
        let empty = AgentTable::from_rows(&[]).unwrap();
        assert!(matches!(build(&empty, 1.0, 2.0, 1.5), Err(AnalyzerError::InvalidInput(_))));

        let agents = table(&[(0.0, 0.0)]);
        assert!(build(&agents, -1.0, 2.0, 1.5).is_err());
        assert!(build(&agents, 3.0, 2.0, 1.5).is_err());
        assert!(build(&agents, 1.0, 2.0, 0.5).is_err());
    }
}
