pub mod a_star;
pub mod bfs;
pub mod common;
pub mod dijkstra;
pub mod greedy;
pub mod lpa_star;

use crate::config::SearchConfig;
use crate::error::SearchError;
use rustc_hash::FxHashMap;
use std::fmt;
use std::str::FromStr;

pub use a_star::AStar;
pub use bfs::BreadthFirst;
pub use common::{Outcome, PathfindingAlgorithm, SearchTask, TaskStatus};
pub use dijkstra::Dijkstra;
pub use greedy::GreedyBestFirst;
pub use lpa_star::LpaStar;

/// Identifier of a search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmKind {
    BreadthFirst,
    GreedyBestFirst,
    Dijkstra,
    AStar,
    LpaStar,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 5] = [
        AlgorithmKind::BreadthFirst,
        AlgorithmKind::GreedyBestFirst,
        AlgorithmKind::Dijkstra,
        AlgorithmKind::AStar,
        AlgorithmKind::LpaStar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AlgorithmKind::BreadthFirst => "bfs",
            AlgorithmKind::GreedyBestFirst => "greedy",
            AlgorithmKind::Dijkstra => "dijkstra",
            AlgorithmKind::AStar => "a_star",
            AlgorithmKind::LpaStar => "lpa_star",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlgorithmKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SearchError::UnknownAlgorithm(s.to_string()))
    }
}

/// Builds a fresh instance of `kind`.
pub fn create_algorithm(kind: AlgorithmKind, config: &SearchConfig) -> Box<dyn PathfindingAlgorithm> {
    match kind {
        AlgorithmKind::BreadthFirst => Box::new(BreadthFirst::new(config.clone())),
        AlgorithmKind::GreedyBestFirst => Box::new(GreedyBestFirst::new(config.clone())),
        AlgorithmKind::Dijkstra => Box::new(Dijkstra::new(config.clone())),
        AlgorithmKind::AStar => Box::new(AStar::new(config.clone())),
        AlgorithmKind::LpaStar => Box::new(LpaStar::with_config(config)),
    }
}

/// One instance per strategy, created on first use and reused afterwards.
/// Built by the caller and passed to whatever needs it.
pub struct AlgorithmRegistry {
    config: SearchConfig,
    instances: FxHashMap<AlgorithmKind, Box<dyn PathfindingAlgorithm>>,
}

impl AlgorithmRegistry {
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(AlgorithmRegistry {
            config,
            instances: FxHashMap::default(),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn get(&mut self, kind: AlgorithmKind) -> &mut dyn PathfindingAlgorithm {
        let config = &self.config;
        self.instances
            .entry(kind)
            .or_insert_with(|| create_algorithm(kind, config))
            .as_mut()
    }

    /// Looks an algorithm up by its name, e.g. `"a_star"`.
    pub fn by_name(&mut self, name: &str) -> Result<&mut dyn PathfindingAlgorithm, SearchError> {
        let kind = name.parse()?;
        Ok(self.get(kind))
    }
}
