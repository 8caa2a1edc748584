use fleet_cluster_analyzer::cluster::baseline;
use fleet_cluster_analyzer::cluster::metrics::{describe_clusters, SizeDistribution};
use fleet_cluster_analyzer::config::Config;
use fleet_cluster_analyzer::data::loader::load_agent_table;
use fleet_cluster_analyzer::data::synthetic::{generate, PlacementMode};
use fleet_cluster_analyzer::storage::{self, InstanceLayout};
use fleet_cluster_analyzer::{aggregate, build, cluster_with_order, fo1};

#[test]
fn test_full_pipeline_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new(5.0, 200.0, 1.5, 5.0, 42);
    config.validate().unwrap();

    let layout = InstanceLayout::new(dir.path(), 120, config.seed);
    let agents = generate(120, 100.0, PlacementMode::Uniform, config.seed).unwrap();
    storage::save_agents(&agents, &layout.agents()).unwrap();

    // CSV goes through polars and must come back with the same ids
    let loaded = load_agent_table(&layout.agents()).unwrap();
    assert_eq!(loaded.len(), 120);
    for (a, b) in agents.iter().zip(loaded.iter()) {
        assert_eq!(a.id, b.id);
        assert!((a.x - b.x).abs() < 1e-9);
        assert!((a.v - b.v).abs() < 1e-9);
    }

    let outcome = build(&loaded, config.radius0, config.radius_max, config.growth_factor).unwrap();
    assert_eq!(outcome.component_count, 1);
    assert!(outcome.final_radius <= config.radius_max);
    storage::save_graph(&outcome, &layout.graph_dir()).unwrap();
    let graph = storage::load_graph(&layout.graph()).unwrap();

    let greedy = cluster_with_order(&graph, config.delta_v, config.seed_order).unwrap();
    let kmeans = baseline::kmeans(&loaded, config.kmeans_clusters, config.kmeans_max_iterations, config.seed).unwrap();
    let components = baseline::components(&graph);

    // Every node is covered exactly once
    let clusters = describe_clusters(&graph, &greedy).unwrap();
    assert_eq!(clusters.iter().map(|c| c.size).sum::<usize>(), 120);
    assert!(fo1(&greedy, &graph).unwrap() > 0.0);
    assert_eq!(SizeDistribution::from_partition(&components).cluster_count, 1);

    for (name, partition) in [("greedy-fo1", &greedy), ("kmeans", &kmeans), ("components", &components)] {
        storage::save_partition(name, partition, &layout.partition(name)).unwrap();
        storage::save_clustering_summary(name, partition, &graph, &layout.cluster_dir(name)).unwrap();
    }

    let (_, reloaded) = storage::load_partition(&layout.partition("greedy-fo1")).unwrap();
    assert_eq!(reloaded, greedy);

    let partitions = vec![greedy, kmeans, components];
    let matrix = aggregate(&partitions, graph.node_count, config.consensus).unwrap();

    // The components partition is a single cluster, so every pair co-occurs
    assert_eq!(matrix.edge_count(), 120 * 119 / 2);
    for entry in matrix.entries() {
        assert!(entry.weight >= 1.0 / 3.0 - 1e-12 && entry.weight <= 1.0);
        assert!(entry.i < entry.j);
    }

    let names: Vec<String> = ["greedy-fo1", "kmeans", "components"].iter().map(|s| s.to_string()).collect();
    storage::save_consensus(&matrix, &names, &layout.consensus_dir()).unwrap();
    assert!(layout.consensus_dir().join("cooccurrence_edges.csv").exists());
}
