use crate::algorithms::common::{
    expand, flow_tree, heuristic, relax_weighted, FlowMap, PathfindingAlgorithm, SearchTask,
    SearchTrace, TaskStatus,
};
use crate::algorithms::AlgorithmKind;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::frontier::Order;
use crate::graph::{Graph, Location};

/// Implements the A* pathfinding algorithm over a weighted graph.
///
/// Priority is `g(n) + h(n)`: the accumulated cost plus the Manhattan
/// distance from the candidate to the goal, scaled by
/// [`SearchConfig::min_edge_cost`]. The heuristic never overestimates while
/// no passable edge is cheaper than that scale, so the result is
/// cost-optimal. Equal priorities are broken by the straight bias.
#[derive(Debug, Default)]
pub struct AStar {
    config: SearchConfig,
    trace: SearchTrace,
}

impl AStar {
    /// Creates a new instance of the A* algorithm.
    pub fn new(config: SearchConfig) -> Self {
        AStar {
            config,
            trace: SearchTrace::default(),
        }
    }
}

impl PathfindingAlgorithm for AStar {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::AStar
    }

    fn description(&self) -> &'static str {
        "A* search: f(n) = g(n) + h(n), accumulated cost plus Manhattan distance to the goal."
    }

    fn trace(&self) -> &SearchTrace {
        &self.trace
    }

    fn trace_mut(&mut self) -> &mut SearchTrace {
        &mut self.trace
    }

    /// Expands the node with the lowest `f` score.
    ///
    /// # Arguments
    ///
    /// * `graph` - The graph being searched.
    /// * `task` - The in-progress query.
    ///
    /// # Returns
    ///
    /// [`TaskStatus::Complete`] once the goal is popped or the frontier is
    /// empty, with the path stored in `task.path`.
    fn advance(&mut self, graph: &Graph, task: &mut SearchTask) -> Result<TaskStatus, SearchError> {
        let bias = self.config.straight_bias;
        let scale = self.config.min_edge_cost;
        let goal = task.goal;
        expand(graph, task, |task, node| {
            relax_weighted(task, node, bias, |next| scale * heuristic(next, goal))
        })
    }

    fn supports_flow_map(&self) -> bool {
        true
    }

    /// Without a goal the heuristic is zero everywhere, so the tree is the
    /// uniform-cost one.
    fn flow_map(&self, graph: &Graph, start: Location) -> Result<FlowMap, SearchError> {
        let bias = self.config.straight_bias;
        flow_tree(graph, start, Order::Ascending, |task, node| {
            relax_weighted(task, node, bias, |_| 0.0)
        })
    }
}
