//! Agent table and data sources

pub mod loader;
pub mod synthetic;

use serde::{Deserialize, Serialize};
use crate::error::{AnalyzerError, Result};

/// A single mobile agent (robot)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Dense 0-based index, also the node id in every graph
    pub id: u32,
    pub x: f64,
    pub y: f64,
    /// Speed
    pub v: f64,
    /// Heading in radians
    pub theta: f64,
    pub battery: f64,
}

impl Agent {
    /// Position as a fixed-size array, the layout spatial indexes expect
    pub fn position(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Euclidean distance between two agents
    pub fn distance_to(&self, other: &Agent) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Immutable table of agents indexed by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTable {
    agents: Vec<Agent>,
}

impl AgentTable {
    /// Build a table from `(x, y, v, theta, battery)` rows; row index becomes the id
    pub fn from_rows(rows: &[[f64; 5]]) -> Result<Self> {
        let agents = rows
            .iter()
            .enumerate()
            .map(|(i, row)| Agent {
                id: i as u32,
                x: row[0],
                y: row[1],
                v: row[2],
                theta: row[3],
                battery: row[4],
            })
            .collect();

        Self::from_agents(agents)
    }

    /// Wrap agents whose ids must already be `0..len`
    pub fn from_agents(agents: Vec<Agent>) -> Result<Self> {
        for (i, agent) in agents.iter().enumerate() {
            if agent.id as usize != i {
                return Err(AnalyzerError::invalid(format!(
                    "agent at row {} has id {}, ids must be dense and 0-based",
                    i, agent.id
                )));
            }
            if !agent.x.is_finite() || !agent.y.is_finite() || !agent.v.is_finite() {
                return Err(AnalyzerError::invalid(format!(
                    "agent {} has a non-finite position or velocity",
                    i
                )));
            }
        }

        Ok(Self { agents })
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// Feature rows in `(x, y, v, theta, battery)` order
    pub fn feature_rows(&self) -> Vec<[f64; 5]> {
        self.agents
            .iter()
            .map(|a| [a.x, a.y, a.v, a.theta, a.battery])
            .collect()
    }
}
