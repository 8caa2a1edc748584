use std::path::PathBuf;
use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;

use fleet_cluster_analyzer::cluster::baseline;
use fleet_cluster_analyzer::cluster::greedy::{cluster_with_order, SeedOrder};
use fleet_cluster_analyzer::cluster::metrics::{fo1, SizeDistribution};
use fleet_cluster_analyzer::config::{Config, Scale, DEFAULT_DELTA_V, DEFAULT_SEED};
use fleet_cluster_analyzer::consensus::{aggregate, ConsensusOptions, Retention, Storage};
use fleet_cluster_analyzer::data::loader::load_agent_table;
use fleet_cluster_analyzer::data::synthetic::{self, PlacementMode};
use fleet_cluster_analyzer::graph::{build, build_fixed};
use fleet_cluster_analyzer::storage::{self, InstanceLayout};

#[derive(Parser, Debug)]
#[clap(
    name = "fleet-cluster-analyzer",
    about = "Proximity graphs, greedy clustering and consensus for robot fleets"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Root directory for generated instances and results
    #[clap(long, default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0", global = true)]
    threads: usize,

    /// Verbose logging
    #[clap(long, short, global = true)]
    verbose: bool,
}

/// Identifies one generated instance
#[derive(Args, Debug)]
struct InstanceArgs {
    /// Number of robots in the instance
    #[clap(long)]
    num_robots: usize,

    /// Seed used when the instance was generated
    #[clap(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a synthetic robot fleet
    Generate {
        #[clap(flatten)]
        instance: InstanceArgs,

        /// Side of the square area (defaults to the preset for the fleet size)
        #[clap(long)]
        side: Option<f64>,

        /// Position layout
        #[clap(long, value_enum, default_value = "uniform")]
        mode: PlacementMode,
    },

    /// Build the epsilon-ball proximity graph
    BuildGraph {
        #[clap(flatten)]
        instance: InstanceArgs,

        /// Proximity radius (initial radius when growing)
        #[clap(long)]
        radius: f64,

        /// Grow the radius up to this cap until the graph is connected
        #[clap(long)]
        radius_max: Option<f64>,

        /// Radius growth factor
        #[clap(long, default_value = "1.5")]
        growth: f64,
    },

    /// Partition the fleet with one method
    Cluster {
        #[clap(flatten)]
        instance: InstanceArgs,

        #[clap(long, value_enum)]
        method: Method,

        /// Maximum velocity difference to the cluster seed
        #[clap(long, default_value_t = DEFAULT_DELTA_V)]
        delta_v: f64,

        /// Seed order for the greedy heuristic
        #[clap(long, value_enum, default_value = "node-id")]
        seed_order: SeedOrder,

        /// Number of k-means clusters
        #[clap(long, default_value = "5")]
        k: usize,
    },

    /// Merge saved partitions into a co-occurrence graph
    Consensus {
        #[clap(flatten)]
        instance: InstanceArgs,

        /// Methods whose partitions are merged
        #[clap(long, value_enum, value_delimiter = ',', default_value = "greedy-fo1,kmeans,components")]
        methods: Vec<Method>,

        #[clap(long, value_enum, default_value = "sparse")]
        storage: Storage,

        /// Keep only pairs seen in at least this many partitions
        #[clap(long, conflicts_with = "top_k")]
        min_count: Option<u32>,

        /// Keep only each node's k strongest partners
        #[clap(long)]
        top_k: Option<usize>,
    },

    /// Score saved partitions against the graph
    Evaluate {
        #[clap(flatten)]
        instance: InstanceArgs,

        #[clap(long, value_enum, value_delimiter = ',', default_value = "greedy-fo1,kmeans,components")]
        methods: Vec<Method>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Method {
    GreedyFo1,
    Kmeans,
    Components,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::GreedyFo1 => "greedy-fo1",
            Method::Kmeans => "kmeans",
            Method::Components => "components",
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::debug!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    match args.command {
        Command::Generate { instance, side, mode } => {
            let layout = InstanceLayout::new(&args.data_dir, instance.num_robots, instance.seed);
            let side = side.unwrap_or_else(|| Scale::for_robot_count(instance.num_robots).area_side());

            let agents = synthetic::generate(instance.num_robots, side, mode, instance.seed)?;
            storage::save_agents(&agents, &layout.agents())?;
        }

        Command::BuildGraph { instance, radius, radius_max, growth } => {
            let layout = InstanceLayout::new(&args.data_dir, instance.num_robots, instance.seed);
            let agents = load_agent_table(&layout.agents())?;

            let outcome = match radius_max {
                Some(cap) => build(&agents, radius, cap, growth)?,
                None => build_fixed(&agents, radius)?,
            };
            if outcome.is_degraded() {
                log::warn!(
                    "Graph has {} components; pass a larger --radius-max to connect it",
                    outcome.component_count
                );
            }
            storage::save_graph(&outcome, &layout.graph_dir())?;
        }

        Command::Cluster { instance, method, delta_v, seed_order, k } => {
            let layout = InstanceLayout::new(&args.data_dir, instance.num_robots, instance.seed);
            let graph = storage::load_graph(&layout.graph())?;

            let config = Config {
                delta_v,
                seed: instance.seed,
                seed_order,
                kmeans_clusters: k,
                ..Config::default()
            };
            config.validate()?;

            let partition = match method {
                Method::GreedyFo1 => cluster_with_order(&graph, config.delta_v, config.seed_order)?,
                Method::Kmeans => {
                    let agents = load_agent_table(&layout.agents())?;
                    baseline::kmeans(&agents, config.kmeans_clusters, config.kmeans_max_iterations, config.seed)?
                }
                Method::Components => baseline::components(&graph),
            };

            let name = method.as_str();
            storage::save_partition(name, &partition, &layout.partition(name))?;
            storage::save_clustering_summary(name, &partition, &graph, &layout.cluster_dir(name))?;
        }

        Command::Consensus { instance, methods, storage: storage_mode, min_count, top_k } => {
            let layout = InstanceLayout::new(&args.data_dir, instance.num_robots, instance.seed);
            if methods.is_empty() {
                bail!("at least one method is required");
            }

            let retention = match (min_count, top_k) {
                (Some(c), _) => Retention::MinCount(c),
                (None, Some(k)) => Retention::TopK(k),
                (None, None) => Retention::All,
            };
            let options = ConsensusOptions { storage: storage_mode, retention };

            let mut names = Vec::with_capacity(methods.len());
            let mut partitions = Vec::with_capacity(methods.len());
            for method in &methods {
                let (name, partition) = storage::load_partition(&layout.partition(method.as_str()))?;
                names.push(name);
                partitions.push(partition);
            }

            let node_count = partitions[0].len();
            let matrix = aggregate(&partitions, node_count, options)?;
            storage::save_consensus(&matrix, &names, &layout.consensus_dir())?;
        }

        Command::Evaluate { instance, methods } => {
            let layout = InstanceLayout::new(&args.data_dir, instance.num_robots, instance.seed);
            let graph = storage::load_graph(&layout.graph())?;

            let mut rows = Vec::with_capacity(methods.len());
            for method in &methods {
                let (name, partition) = storage::load_partition(&layout.partition(method.as_str()))?;
                let score = fo1(&partition, &graph)?;
                let sizes = SizeDistribution::from_partition(&partition);

                log::info!(
                    "[{}] clusters={} FO1={:.2} largest={} singletons={}",
                    name, sizes.cluster_count, score, sizes.largest, sizes.singletons
                );
                rows.push(json!({ "method": name, "fo1": score, "sizes": sizes }));
            }

            let path = layout.root.join("evaluation.json");
            std::fs::write(&path, serde_json::to_string_pretty(&rows)?)?;
            log::info!("Evaluation saved to {}", path.display());
        }
    }

    Ok(())
}
