use crate::algorithms::common::{
    expand, flow_tree, relax_weighted, FlowMap, PathfindingAlgorithm, SearchTask, SearchTrace,
    TaskStatus,
};
use crate::algorithms::AlgorithmKind;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::frontier::Order;
use crate::graph::{Graph, Location};

/// Uniform-cost search ordered by accumulated path cost.
#[derive(Debug, Default)]
pub struct Dijkstra {
    config: SearchConfig,
    trace: SearchTrace,
}

impl Dijkstra {
    pub fn new(config: SearchConfig) -> Self {
        Dijkstra {
            config,
            trace: SearchTrace::default(),
        }
    }
}

impl PathfindingAlgorithm for Dijkstra {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Dijkstra
    }

    fn description(&self) -> &'static str {
        "Dijkstra (uniform-cost search): expands the cheapest accumulated path first."
    }

    fn trace(&self) -> &SearchTrace {
        &self.trace
    }

    fn trace_mut(&mut self) -> &mut SearchTrace {
        &mut self.trace
    }

    fn advance(&mut self, graph: &Graph, task: &mut SearchTask) -> Result<TaskStatus, SearchError> {
        let bias = self.config.straight_bias;
        expand(graph, task, |task, node| relax_weighted(task, node, bias, |_| 0.0))
    }

    fn supports_flow_map(&self) -> bool {
        true
    }

    fn flow_map(&self, graph: &Graph, start: Location) -> Result<FlowMap, SearchError> {
        let bias = self.config.straight_bias;
        flow_tree(graph, start, Order::Ascending, |task, node| {
            relax_weighted(task, node, bias, |_| 0.0)
        })
    }
}
