use crate::algorithms::common::{
    expand, heuristic, PathfindingAlgorithm, SearchTask, SearchTrace, TaskStatus,
};
use crate::algorithms::AlgorithmKind;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::graph::{Graph, Node};

/// Greedy best-first search: always expands the node that looks closest to
/// the goal. First discovery wins, so the path is valid but not necessarily
/// the cheapest.
#[derive(Debug, Default)]
pub struct GreedyBestFirst {
    config: SearchConfig,
    trace: SearchTrace,
}

impl GreedyBestFirst {
    pub fn new(config: SearchConfig) -> Self {
        GreedyBestFirst {
            config,
            trace: SearchTrace::default(),
        }
    }

    fn relax(&self, task: &mut SearchTask, node: &Node) -> Result<(), SearchError> {
        let current = node.location();
        let base = task.cost_so_far.get(&current).copied().unwrap_or_default();
        let edges = node
            .edges()
            .iter()
            .filter(|e| e.is_passable() && e.cost <= self.config.unweighted_cost_limit);

        for edge in edges {
            let next = edge.target();
            if task.came_from.contains_key(&next) {
                continue;
            }
            task.came_from.insert(next, Some(current));
            task.cost_so_far.insert(next, base + edge.cost);
            task.frontier.put(next, (heuristic(next, task.goal), 0.0));
        }
        Ok(())
    }
}

impl PathfindingAlgorithm for GreedyBestFirst {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::GreedyBestFirst
    }

    fn description(&self) -> &'static str {
        "Greedy best-first search: expands the node nearest the goal first; fast but not cost-optimal."
    }

    fn trace(&self) -> &SearchTrace {
        &self.trace
    }

    fn trace_mut(&mut self) -> &mut SearchTrace {
        &mut self.trace
    }

    fn advance(&mut self, graph: &Graph, task: &mut SearchTask) -> Result<TaskStatus, SearchError> {
        expand(graph, task, |task, node| self.relax(task, node))
    }
}
