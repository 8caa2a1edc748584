//! Results persistence module

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::{Serialize, Deserialize};
use serde_json::{json, to_string_pretty};
use crate::cluster::metrics::{describe_clusters, fo1, SizeDistribution};
use crate::cluster::Partition;
use crate::consensus::CoOccurrenceMatrix;
use crate::data::AgentTable;
use crate::error::AnalyzerError;
use crate::graph::{BuildOutcome, ProximityGraph};

/// File locations for one generated instance
#[derive(Debug, Clone)]
pub struct InstanceLayout {
    pub root: PathBuf,
}

impl InstanceLayout {
    /// `<data_dir>/robots_<n>_seed<seed>`
    pub fn new(data_dir: &Path, robot_count: usize, seed: u64) -> Self {
        Self {
            root: data_dir.join(format!("robots_{}_seed{}", robot_count, seed)),
        }
    }

    pub fn agents(&self) -> PathBuf {
        self.root.join("agents.csv")
    }

    pub fn graph_dir(&self) -> PathBuf {
        self.root.join("graph")
    }

    pub fn graph(&self) -> PathBuf {
        self.graph_dir().join("graph.bin")
    }

    pub fn cluster_dir(&self, method: &str) -> PathBuf {
        self.root.join("cluster").join(method)
    }

    pub fn partition(&self, method: &str) -> PathBuf {
        self.cluster_dir(method).join("labels.json")
    }

    pub fn consensus_dir(&self) -> PathBuf {
        self.root.join("consensus")
    }
}

/// On-disk partition interchange record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionRecord {
    pub method: String,
    pub labels: Vec<u32>,
}

fn require(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        return Err(AnalyzerError::missing(format!("{} not found: {}", what, path.display())).into());
    }
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    Ok(())
}

/// Write the agent table as CSV with the columns the loader expects
pub fn save_agents(agents: &AgentTable, path: &Path) -> Result<()> {
    log::info!("Saving {} agents to {}", agents.len(), path.display());
    create_parent(path)?;

    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "x,y,v,theta,battery")?;
    for a in agents.iter() {
        writeln!(file, "{},{},{},{},{}", a.x, a.y, a.v, a.theta, a.battery)?;
    }
    file.flush()?;

    Ok(())
}

/// Save a built graph: binary graph, edge/node CSVs and build statistics
pub fn save_graph(outcome: &BuildOutcome, dir: &Path) -> Result<()> {
    let graph = &outcome.graph;
    log::info!(
        "Saving graph with {} nodes and {} edges to {}",
        graph.node_count, graph.edge_count(), dir.display()
    );

    fs::create_dir_all(dir)?;

    let mut writer = BufWriter::new(File::create(dir.join("graph.bin"))?);
    bincode::serialize_into(&mut writer, graph).context("encoding graph")?;
    writer.flush()?;

    let mut edges = BufWriter::new(File::create(dir.join("graph_edges.csv"))?);
    writeln!(edges, "u,v,weight")?;
    for (u, v, w) in graph.edges() {
        writeln!(edges, "{},{},{}", u, v, w)?;
    }
    edges.flush()?;

    let mut nodes = BufWriter::new(File::create(dir.join("graph_nodes.csv"))?);
    writeln!(nodes, "id,x,y,vel,theta,bat")?;
    for (id, n) in graph.nodes.iter().enumerate() {
        writeln!(nodes, "{},{},{},{},{},{}", id, n.x, n.y, n.velocity, n.heading, n.battery)?;
    }
    nodes.flush()?;

    save_graph_stats(outcome, dir)?;

    Ok(())
}

/// Save graph statistics
fn save_graph_stats(outcome: &BuildOutcome, dir: &Path) -> Result<()> {
    let graph = &outcome.graph;

    // Calculate degree distribution
    let mut degree_dist = vec![0usize; 101]; // 0-100+ buckets
    for node in 0..graph.node_count {
        let bucket = std::cmp::min(graph.degree(node), 100);
        degree_dist[bucket] += 1;
    }

    let stats = json!({
        "node_count": graph.node_count,
        "edge_count": graph.edge_count(),
        "final_radius": outcome.final_radius,
        "component_count": outcome.component_count,
        "iterations": outcome.iterations,
        "degraded": outcome.is_degraded(),
        "avg_degree": graph.average_degree(),
        "memory_bytes": graph.memory_usage(),
        "degree_distribution": degree_dist,
    });

    let mut file = File::create(dir.join("graph_stats.json"))?;
    file.write_all(to_string_pretty(&stats)?.as_bytes())?;

    Ok(())
}

/// Load a graph written by [`save_graph`]
pub fn load_graph(path: &Path) -> Result<ProximityGraph> {
    require(path, "graph")?;
    log::info!("Loading graph from {}", path.display());

    let reader = BufReader::new(File::open(path)?);
    let graph: ProximityGraph = bincode::deserialize_from(reader)
        .with_context(|| format!("decoding graph {}", path.display()))?;

    Ok(graph)
}

/// Save a partition as a JSON label array
pub fn save_partition(method: &str, partition: &Partition, path: &Path) -> Result<()> {
    create_parent(path)?;

    let record = PartitionRecord {
        method: method.to_string(),
        labels: partition.labels().to_vec(),
    };
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(&record)?.as_bytes())?;

    Ok(())
}

/// Load a partition written by [`save_partition`]
pub fn load_partition(path: &Path) -> Result<(String, Partition)> {
    require(path, "partition")?;

    let reader = BufReader::new(File::open(path)?);
    let record: PartitionRecord = serde_json::from_reader(reader)
        .with_context(|| format!("decoding partition {}", path.display()))?;

    Ok((record.method, Partition::from_labels(record.labels)))
}

/// Save the FO1 score, size distribution and per-cluster summaries
pub fn save_clustering_summary(
    method: &str,
    partition: &Partition,
    graph: &ProximityGraph,
    dir: &Path,
) -> Result<()> {
    fs::create_dir_all(dir)?;

    let score = fo1(partition, graph)?;
    let clusters = describe_clusters(graph, partition)?;
    let distribution = SizeDistribution::from_partition(partition);

    log::info!(
        "{}: {} clusters, FO1 {:.2}, largest {}",
        method, distribution.cluster_count, score, distribution.largest
    );

    let summary = json!({
        "method": method,
        "fo1": score,
        "sizes": distribution,
        "largest_clusters": clusters.iter().take(5).map(|c| c.size).collect::<Vec<_>>(),
        "clusters": clusters.iter().map(|c| {
            json!({
                "id": c.id,
                "size": c.size,
                "min_velocity": c.min_velocity,
                "density": c.density,
            })
        }).collect::<Vec<_>>(),
    });

    let mut file = File::create(dir.join("summary.json"))?;
    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

/// Save the consensus matrix and its edge list
pub fn save_consensus(matrix: &CoOccurrenceMatrix, methods: &[String], dir: &Path) -> Result<()> {
    log::info!("Saving consensus graph with {} edges to {}", matrix.edge_count(), dir.display());
    fs::create_dir_all(dir)?;

    let document = json!({
        "methods": methods,
        "matrix": matrix,
    });
    let mut file = File::create(dir.join("cooccurrence.json"))?;
    file.write_all(to_string_pretty(&document)?.as_bytes())?;

    let mut edges = BufWriter::new(File::create(dir.join("cooccurrence_edges.csv"))?);
    writeln!(edges, "source,target,weight")?;
    for entry in matrix.entries() {
        writeln!(edges, "{},{},{:.3}", entry.i, entry.j, entry.weight)?;
    }
    edges.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_fixed;

    #[test]
    fn test_missing_graph_is_a_missing_prerequisite() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_graph(&dir.path().join("graph.bin")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalyzerError>(),
            Some(AnalyzerError::MissingPrerequisite(_))
        ));
    }

    #[test]
    fn test_graph_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let agents = AgentTable::from_rows(&[
            [0.0, 0.0, 10.0, 0.0, 90.0],
            [1.0, 1.0, 11.0, 0.2, 80.0],
            [9.0, 9.0, 30.0, 0.4, 70.0],
        ])
        .unwrap();
        let outcome = build_fixed(&agents, 2.0).unwrap();

        save_graph(&outcome, dir.path()).unwrap();
        let loaded = load_graph(&dir.path().join("graph.bin")).unwrap();
        assert_eq!(loaded, outcome.graph);

        let edges = fs::read_to_string(dir.path().join("graph_edges.csv")).unwrap();
        assert_eq!(edges.lines().count(), 2);

        let stats: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("graph_stats.json")).unwrap()).unwrap();
        assert_eq!(stats["edge_count"], 1);
        assert_eq!(stats["memory_bytes"].as_u64().unwrap() as usize, outcome.graph.memory_usage());
    }

    #[test]
    fn test_partition_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greedy").join("labels.json");
        let partition = Partition::from_labels(vec![0, 0, 1]);

        save_partition("greedy-fo1", &partition, &path).unwrap();
        let (method, loaded) = load_partition(&path).unwrap();
        assert_eq!(method, "greedy-fo1");
        assert_eq!(loaded, partition);
    }

    #[test]
    fn test_layout_paths() {
        let layout = InstanceLayout::new(Path::new("data"), 300, 42);
        assert_eq!(layout.agents(), PathBuf::from("data/robots_300_seed42/agents.csv"));
        assert_eq!(
            layout.partition("kmeans"),
            PathBuf::from("data/robots_300_seed42/cluster/kmeans/labels.json")
        );
    }
}
