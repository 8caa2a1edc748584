//! Configuration management for the fleet cluster analyzer

use crate::cluster::greedy::SeedOrder;
use crate::consensus::ConsensusOptions;
use crate::error::{AnalyzerError, Result};

/// Default random seed for generation and baselines
pub const DEFAULT_SEED: u64 = 42;

/// Default communication radius between robots
pub const DEFAULT_RADIUS: f64 = 50.0;

/// Default maximum velocity difference allowed inside a cluster
pub const DEFAULT_DELTA_V: f64 = 5.0;

/// Preset instance sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// Debugging and manual validation
    Small,
    /// Heuristic comparison
    Medium,
    /// Scalability runs
    Large,
}

impl Scale {
    /// Number of robots in the instance
    pub fn robot_count(self) -> usize {
        match self {
            Scale::Small => 300,
            Scale::Medium => 3_000,
            Scale::Large => 10_000,
        }
    }

    /// Side of the square area the robots are spread over
    pub fn area_side(self) -> f64 {
        match self {
            Scale::Small => 300.0,
            Scale::Medium => 1_000.0,
            Scale::Large => 3_000.0,
        }
    }

    /// Pick the smallest preset that holds `robots`
    pub fn for_robot_count(robots: usize) -> Self {
        if robots <= Scale::Small.robot_count() {
            Scale::Small
        } else if robots <= Scale::Medium.robot_count() {
            Scale::Medium
        } else {
            Scale::Large
        }
    }
}

/// Parameters for a full analysis run
#[derive(Debug, Clone)]
pub struct Config {
    /// Initial proximity radius
    pub radius0: f64,

    /// Cap for adaptive radius growth
    pub radius_max: f64,

    /// Multiplier applied to the radius while the graph is disconnected
    pub growth_factor: f64,

    /// Maximum velocity difference to the cluster anchor
    pub delta_v: f64,

    /// Seed for every random operation
    pub seed: u64,

    /// Order in which the greedy clusterer picks seeds
    pub seed_order: SeedOrder,

    /// Number of k-means clusters for the baseline partition
    pub kmeans_clusters: usize,

    /// Iteration cap for k-means
    pub kmeans_max_iterations: usize,

    /// Co-occurrence storage and retention
    pub consensus: ConsensusOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            radius0: DEFAULT_RADIUS,
            radius_max: DEFAULT_RADIUS * 8.0,
            growth_factor: 1.5,
            delta_v: DEFAULT_DELTA_V,
            seed: DEFAULT_SEED,
            seed_order: SeedOrder::NodeId,
            kmeans_clusters: 5,
            kmeans_max_iterations: 100,
            consensus: ConsensusOptions::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with custom graph and clustering values
    pub fn new(
        radius0: f64,
        radius_max: f64,
        growth_factor: f64,
        delta_v: f64,
        seed: u64,
    ) -> Self {
        Self {
            radius0,
            radius_max,
            growth_factor,
            delta_v,
            seed,
            ..Self::default()
        }
    }

    /// Check the radius policy and velocity tolerance
    pub fn validate(&self) -> Result<()> {
        validate_radius_policy(self.radius0, self.radius_max, self.growth_factor)?;
        if !self.delta_v.is_finite() || self.delta_v < 0.0 {
            return Err(AnalyzerError::invalid(format!(
                "delta_v must be a non-negative number, got {}",
                self.delta_v
            )));
        }
        if self.kmeans_clusters == 0 {
            return Err(AnalyzerError::invalid("kmeans_clusters must be at least 1"));
        }
        Ok(())
    }
}

/// Validate the adaptive radius parameters
pub fn validate_radius_policy(radius0: f64, radius_max: f64, growth_factor: f64) -> Result<()> {
    if !radius0.is_finite() || radius0 <= 0.0 {
        return Err(AnalyzerError::invalid(format!(
            "initial radius must be positive, got {}",
            radius0
        )));
    }
    if !radius_max.is_finite() || radius_max < radius0 {
        return Err(AnalyzerError::invalid(format!(
            "radius cap {} must be at least the initial radius {}",
            radius_max, radius0
        )));
    }
    if !growth_factor.is_finite() || growth_factor <= 1.0 {
        return Err(AnalyzerError::invalid(format!(
            "growth factor must be greater than 1, got {}",
            growth_factor
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_radius_policy() {
        assert!(validate_radius_policy(0.0, 10.0, 1.5).is_err());
        assert!(validate_radius_policy(5.0, 4.0, 1.5).is_err());
        assert!(validate_radius_policy(5.0, 10.0, 1.0).is_err());
        assert!(validate_radius_policy(5.0, 5.0, 2.0).is_ok());
    }

    #[test]
    fn test_rejects_negative_delta_v() {
        let mut config = Config::default();
        config.delta_v = -1.0;
        assert!(matches!(config.validate(), Err(AnalyzerError::InvalidInput(_))));
    }

    #[test]
    fn test_scale_presets() {
        assert_eq!(Scale::for_robot_count(100), Scale::Small);
        assert_eq!(Scale::for_robot_count(3_000), Scale::Medium);
        assert_eq!(Scale::for_robot_count(5_000), Scale::Large);
        assert_eq!(Scale::Large.area_side(), 3_000.0);
    }
}
