//! Proximity graph representation and construction

pub mod proximity;
pub mod builder;
pub mod spatial;
pub mod algorithms;
pub mod adaptive;

pub use proximity::{NodeAttributes, ProximityGraph};
pub use adaptive::{build, build_fixed, BuildOutcome};
