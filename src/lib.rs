//! Grid pathfinding engine: five interchangeable search strategies over a
//! weighted, directed graph, including an incremental planner (LPA*) that
//! repairs its answer after edge-cost edits.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod frontier;
pub mod graph;
pub mod simulation;
pub mod statistics;

pub use algorithms::{AlgorithmKind, AlgorithmRegistry, Outcome, PathfindingAlgorithm};
pub use config::{Config, SearchConfig};
pub use error::SearchError;
pub use frontier::{Frontier, Order};
pub use graph::{Cost, Edge, Graph, Location, Node};
