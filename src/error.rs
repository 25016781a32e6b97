use crate::graph::Location;

/// Errors raised while building a graph or answering a query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("node already exists: {0}")]
    DuplicateNode(Location),

    #[error("node not found: {0}")]
    NodeNotFound(Location),

    #[error("edge not found: {from} -> {to}")]
    EdgeNotFound { from: Location, to: Location },

    /// The search reached a node without recording where it came from.
    #[error("no predecessor recorded for {0} before reaching the start")]
    MissingPredecessor(Location),

    /// A node was expanded without a recorded accumulated cost.
    #[error("no accumulated cost recorded for {0}")]
    MissingCost(Location),

    /// Path reconstruction walked more steps than there are recorded nodes.
    #[error("path reconstruction did not terminate after {0} steps")]
    PathCycle(usize),

    #[error("invalid search config: {0}")]
    InvalidConfig(String),

    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
}

impl SearchError {
    /// True for bookkeeping bugs, as opposed to bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            SearchError::MissingPredecessor(_)
                | SearchError::MissingCost(_)
                | SearchError::PathCycle(_)
        )
    }
}
