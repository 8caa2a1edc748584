//! Compressed proximity graph over agent positions

use std::mem;
use serde::{Serialize, Deserialize};
use crate::data::Agent;

/// Per-node copy of the agent attributes the clusterer needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    pub x: f64,
    pub y: f64,
    pub velocity: f64,
    pub heading: f64,
    pub battery: f64,
}

impl From<&Agent> for NodeAttributes {
    fn from(agent: &Agent) -> Self {
        Self {
            x: agent.x,
            y: agent.y,
            velocity: agent.v,
            heading: agent.theta,
            battery: agent.battery,
        }
    }
}

/// Compressed sparse representation of an undirected weighted graph.
///
/// Every undirected edge is stored in both adjacency lists, so
/// `neighbors(u)` yields all nodes adjacent to `u`. Lists are sorted by
/// neighbour id and `weights` is parallel to `neighbors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// Offset array: offsets[i] to offsets[i+1] is the neighbour range of node i
    pub offsets: Vec<u32>,

    /// Concatenated adjacency lists
    pub neighbors: Vec<u32>,

    /// Euclidean distance for each adjacency entry
    pub weights: Vec<f64>,

    /// Node attributes, indexed by node id
    pub nodes: Vec<NodeAttributes>,
}

impl ProximityGraph {
    /// Create an empty graph with pre-allocated capacity
    pub fn with_capacity(node_count: usize, adjacency_len: usize) -> Self {
        Self {
            node_count,
            offsets: Vec::with_capacity(node_count + 1),
            neighbors: Vec::with_capacity(adjacency_len),
            weights: Vec::with_capacity(adjacency_len),
            nodes: Vec::with_capacity(node_count),
        }
    }

    /// Neighbours of a node, ascending
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.neighbors[start..end]
    }

    /// Edge weights of a node, parallel to `neighbors(node)`
    pub fn neighbor_weights(&self, node: usize) -> &[f64] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.weights[start..end]
    }

    pub fn degree(&self, node: usize) -> usize {
        (self.offsets[node + 1] - self.offsets[node]) as usize
    }

    /// Check if nodes `a` and `b` are adjacent
    pub fn has_edge(&self, a: usize, b: u32) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    /// Weight of the edge between `a` and `b`, if any
    pub fn edge_weight(&self, a: usize, b: u32) -> Option<f64> {
        self.neighbors(a)
            .binary_search(&b)
            .ok()
            .map(|pos| self.neighbor_weights(a)[pos])
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.neighbors.len() / 2
    }

    /// Each undirected edge once, as `(u, v, weight)` with `u < v`
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32, f64)> + '_ {
        (0..self.node_count).flat_map(move |u| {
            self.neighbors(u)
                .iter()
                .zip(self.neighbor_weights(u))
                .filter(move |&(&v, _)| (v as usize) > u)
                .map(move |(&v, &w)| (u as u32, v, w))
        })
    }

    pub fn velocity(&self, node: usize) -> f64 {
        self.nodes[node].velocity
    }

    /// Mean degree over all nodes
    pub fn average_degree(&self) -> f64 {
        if self.node_count == 0 {
            return 0.0;
        }
        self.neighbors.len() as f64 / self.node_count as f64
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets = self.offsets.capacity() * mem::size_of::<u32>();
        let neighbors = self.neighbors.capacity() * mem::size_of::<u32>();
        let weights = self.weights.capacity() * mem::size_of::<f64>();
        let nodes = self.nodes.capacity() * mem::size_of::<NodeAttributes>();

        base + offsets + neighbors + weights + nodes
    }
}
