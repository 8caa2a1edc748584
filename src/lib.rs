//! Core library for the fleet cluster analyzer
//!
//! Builds proximity graphs over robot positions, clusters them with a
//! velocity-gated greedy heuristic and merges several partitions into a
//! co-occurrence consensus graph.

pub mod config;
pub mod error;
pub mod data;
pub mod graph;
pub mod cluster;
pub mod consensus;
pub mod storage;

pub use error::{AnalyzerError, Result};
pub use cluster::Partition;
pub use cluster::greedy::{cluster, cluster_with_order, SeedOrder};
pub use cluster::metrics::fo1;
pub use consensus::{aggregate, CoOccurrenceMatrix, ConsensusOptions};
pub use data::{Agent, AgentTable};
pub use graph::{build, build_fixed, BuildOutcome, ProximityGraph};
