//! Graph construction module

use crate::data::Agent;
use crate::error::{AnalyzerError, Result};
use crate::graph::proximity::{NodeAttributes, ProximityGraph};

/// Builder for incrementally constructing a ProximityGraph
pub struct GraphBuilder {
    /// Node attributes, one per node id
    nodes: Vec<NodeAttributes>,

    /// Adjacency lists with weights for each node
    adjacency_lists: Vec<Vec<(u32, f64)>>,
}

impl GraphBuilder {
    /// Create a builder with one node per agent and no edges
    pub fn from_agents(agents: &[Agent]) -> Self {
        Self {
            nodes: agents.iter().map(NodeAttributes::from).collect(),
            adjacency_lists: vec![Vec::new(); agents.len()],
        }
    }

    /// Create a builder from raw node attributes
    pub fn from_nodes(nodes: Vec<NodeAttributes>) -> Self {
        let node_count = nodes.len();
        Self {
            nodes,
            adjacency_lists: vec![Vec::new(); node_count],
        }
    }

    /// Add an undirected edge; self loops and unknown nodes are rejected
    pub fn add_edge(&mut self, a: u32, b: u32, weight: f64) -> Result<()> {
        let node_count = self.nodes.len();
        if a as usize >= node_count || b as usize >= node_count {
            return Err(AnalyzerError::invalid(format!(
                "edge ({}, {}) references a node outside 0..{}",
                a, b, node_count
            )));
        }
        if a == b {
            return Err(AnalyzerError::invalid(format!("self loop on node {}", a)));
        }
        if weight.is_nan() || weight < 0.0 {
            return Err(AnalyzerError::invalid(format!(
                "edge ({}, {}) has invalid weight {}",
                a, b, weight
            )));
        }

        self.adjacency_lists[a as usize].push((b, weight));
        self.adjacency_lists[b as usize].push((a, weight));

        Ok(())
    }

    /// Build the compressed graph
    pub fn build(mut self) -> ProximityGraph {
        let node_count = self.nodes.len();
        let adjacency_len: usize = self.adjacency_lists.iter()
            .map(|list| list.len())
            .sum();

        let mut graph = ProximityGraph::with_capacity(node_count, adjacency_len);

        // Create offsets array
        graph.offsets.push(0);
        let mut offset = 0;

        for list in &mut self.adjacency_lists {
            // Sort for binary search and drop repeated pairs
            list.sort_unstable_by_key(|&(v, _)| v);
            list.dedup_by_key(|&mut (v, _)| v);

            for &(v, w) in list.iter() {
                graph.neighbors.push(v);
                graph.weights.push(w);
            }
            offset += list.len() as u32;
            graph.offsets.push(offset);
        }

        graph.nodes = self.nodes;

        graph
    }
}
