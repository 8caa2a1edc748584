//! Connectivity algorithms on the proximity graph

use crate::graph::ProximityGraph;

/// Union-Find data structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Size of each set, valid at roots (for union by size)
    size: Vec<u32>,

    /// Number of disjoint sets
    sets: usize,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            size: vec![1; size],
            sets: size,
        }
    }

    /// Find the root of the set containing x with path halving
    pub fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Union the sets containing x and y; returns false if already joined
    pub fn union(&mut self, x: u32, y: u32) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return false;
        }

        // Attach smaller tree under root of larger tree
        let (big, small) = if self.size[root_x as usize] >= self.size[root_y as usize] {
            (root_x, root_y)
        } else {
            (root_y, root_x)
        };
        self.parent[small as usize] = big;
        self.size[big as usize] += self.size[small as usize];
        self.sets -= 1;

        true
    }

    /// Number of disjoint sets
    pub fn set_count(&self) -> usize {
        self.sets
    }
}

/// Union every edge of the graph into a fresh disjoint-set forest
fn union_edges(graph: &ProximityGraph) -> DisjointSets {
    let mut sets = DisjointSets::new(graph.node_count);
    for (u, v, _) in graph.edges() {
        sets.union(u, v);
    }
    sets
}

/// Count connected components
pub fn count_components(graph: &ProximityGraph) -> usize {
    union_edges(graph).set_count()
}

/// Label each node with its component index; components are numbered in
/// order of their lowest node id
pub fn component_labels(graph: &ProximityGraph) -> Vec<u32> {
    let mut sets = union_edges(graph);
    let mut root_label = vec![u32::MAX; graph.node_count];
    let mut labels = Vec::with_capacity(graph.node_count);
    let mut next = 0;

    for node in 0..graph.node_count as u32 {
        let root = sets.find(node) as usize;
        if root_label[root] == u32::MAX {
            root_label[root] = next;
            next += 1;
        }
        labels.push(root_label[root]);
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;
    use crate::graph::proximity::NodeAttributes;

    fn empty_nodes(n: usize) -> Vec<NodeAttributes> {
        vec![NodeAttributes { x: 0.0, y: 0.0, velocity: 0.0, heading: 0.0, battery: 0.0 }; n]
    }

    #[test]
    fn test_disjoint_sets() {
        let mut sets = DisjointSets::new(5);
        assert!(sets.union(0, 1));
        assert!(sets.union(3, 4));
        assert!(!sets.union(1, 0));
        assert_eq!(sets.set_count(), 3);
        assert_eq!(sets.find(4), sets.find(3));
    }

    #[test]
    fn test_component_labels_follow_lowest_id() {
        let mut builder = GraphBuilder::from_nodes(empty_nodes(5));
        builder.add_edge(4, 1, 1.0).unwrap();
        builder.add_edge(0, 3, 1.0).unwrap();
        let graph = builder.build();

        assert_eq!(count_components(&graph), 3);
        assert_eq!(component_labels(&graph), vec![0, 1, 2, 0, 1]);
    }
}
