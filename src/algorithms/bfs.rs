use crate::algorithms::common::{
    expand, flow_tree, FlowMap, PathfindingAlgorithm, SearchTask, SearchTrace, TaskStatus,
};
use crate::algorithms::AlgorithmKind;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::frontier::Order;
use crate::graph::{Edge, Graph, Location, Node};

/// Breadth-first search. Ignores movement cost: the first discovery of a
/// node wins, and edges above the unweighted cost limit count as blocked.
#[derive(Debug, Default)]
pub struct BreadthFirst {
    config: SearchConfig,
    trace: SearchTrace,
}

impl BreadthFirst {
    pub fn new(config: SearchConfig) -> Self {
        BreadthFirst {
            config,
            trace: SearchTrace::default(),
        }
    }

    fn relax(&self, task: &mut SearchTask, node: &Node) -> Result<(), SearchError> {
        let current = node.location();
        let base = task.cost_so_far.get(&current).copied().unwrap_or_default();

        let mut edges: Vec<&Edge> = node
            .edges()
            .iter()
            .filter(|e| e.is_passable() && e.cost <= self.config.unweighted_cost_limit)
            .collect();
        if self.config.sort_neighbors {
            let goal = task.goal;
            edges.sort_by_key(|e| e.target().manhattan(goal));
        }

        for edge in edges {
            let next = edge.target();
            if task.came_from.contains_key(&next) {
                continue;
            }
            task.came_from.insert(next, Some(current));
            task.cost_so_far.insert(next, base + edge.cost);
            task.frontier.put(next, (base + edge.cost, 0.0));
        }
        Ok(())
    }
}

impl PathfindingAlgorithm for BreadthFirst {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::BreadthFirst
    }

    fn description(&self) -> &'static str {
        "Breadth-first search: expands nodes in discovery order, ignoring movement cost."
    }

    fn trace(&self) -> &SearchTrace {
        &self.trace
    }

    fn trace_mut(&mut self) -> &mut SearchTrace {
        &mut self.trace
    }

    fn new_task(&self, graph: &Graph, start: Location, goal: Location) -> Result<SearchTask, SearchError> {
        SearchTask::new(graph, start, goal, Order::Fifo)
    }

    fn advance(&mut self, graph: &Graph, task: &mut SearchTask) -> Result<TaskStatus, SearchError> {
        expand(graph, task, |task, node| self.relax(task, node))
    }

    fn supports_flow_map(&self) -> bool {
        true
    }

    fn flow_map(&self, graph: &Graph, start: Location) -> Result<FlowMap, SearchError> {
        flow_tree(graph, start, Order::Fifo, |task, node| self.relax(task, node))
    }
}
