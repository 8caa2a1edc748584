//! k-d tree index over agent positions

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use rayon::prelude::*;
use crate::data::Agent;

/// Relative slack added to the squared query radius; candidates are then
/// filtered with an exact `<=` distance test
const QUERY_SLACK: f64 = 1e-9;

/// Spatial index built once per point set and queried at any radius.
///
/// The immutable tree accepts any number of agents sharing a position.
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, 2>,
    positions: Vec<[f64; 2]>,
}

impl SpatialIndex {
    pub fn new(agents: &[Agent]) -> Self {
        let positions: Vec<[f64; 2]> = agents.iter().map(Agent::position).collect();

        // Items are indices into `positions`
        let tree = ImmutableKdTree::new_from_slice(&positions);

        Self { tree, positions }
    }

    /// Points within `radius` of `node`, excluding `node`, as `(id, distance)`
    /// sorted by id
    pub fn within(&self, node: usize, radius: f64) -> Vec<(u32, f64)> {
        let origin = self.positions[node];
        let query_sq = radius * radius * (1.0 + QUERY_SLACK);

        let mut found: Vec<(u32, f64)> = self.tree
            .within_unsorted::<SquaredEuclidean>(&origin, query_sq)
            .into_iter()
            .filter(|hit| hit.item as usize != node)
            .filter_map(|hit| {
                let other = self.positions[hit.item as usize];
                let dist = (origin[0] - other[0]).hypot(origin[1] - other[1]);
                (dist <= radius).then_some((hit.item as u32, dist))
            })
            .collect();

        found.sort_unstable_by_key(|&(id, _)| id);
        found
    }

    /// Every unordered pair `(i, j, distance)` with `i < j` and distance <= `radius`.
    ///
    /// Queries run in parallel; results come back in ascending `(i, j)` order.
    pub fn pairs_within(&self, radius: f64) -> Vec<(u32, u32, f64)> {
        (0..self.positions.len())
            .into_par_iter()
            .map(|i| {
                self.within(i, radius)
                    .into_iter()
                    .filter(|&(j, _)| j as usize > i)
                    .map(|(j, d)| (i as u32, j, d))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<Vec<_>>>()
            .concat()
    }
}
